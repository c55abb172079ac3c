//! Scoped lifecycle logging and timing
//!
//! `ObservationScope` logs `{EVENT}_BEGIN` on creation and `{EVENT}_COMPLETE`
//! when completed; a scope dropped without completion logs
//! `{EVENT}_INCOMPLETE` at WARN.

use std::cell::Cell;
use std::time::{Duration, Instant};

use super::events::Event;
use super::logger::{Logger, Severity};

pub struct ObservationScope {
    event: Event,
    completed: Cell<bool>,
    timer: Timer,
}

impl ObservationScope {
    pub fn new(event: Event, fields: &[(&str, &str)]) -> Self {
        Logger::log(event.severity(), &format!("{}_BEGIN", event.as_str()), fields);
        Self {
            event,
            completed: Cell::new(false),
            timer: Timer::new(),
        }
    }

    /// Log `{EVENT}_COMPLETE` with the elapsed time and extra fields.
    pub fn complete(self, fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.timer.elapsed().as_millis().to_string();
        let mut all: Vec<(&str, &str)> = vec![("elapsed_ms", elapsed.as_str())];
        all.extend_from_slice(fields);
        Logger::log(
            self.event.severity(),
            &format!("{}_COMPLETE", self.event.as_str()),
            &all,
        );
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::log(
                Severity::Warn,
                &format!("{}_INCOMPLETE", self.event.as_str()),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Accumulating stopwatch.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    started: Option<Instant>,
    total: Duration,
}

impl Timer {
    /// A timer that is already running.
    pub fn new() -> Self {
        Self {
            started: Some(Instant::now()),
            total: Duration::ZERO,
        }
    }

    pub fn resume(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(start) = self.started.take() {
            self.total += start.elapsed();
        }
    }

    /// Time accumulated so far, including a running stretch.
    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(start) => self.total + start.elapsed(),
            None => self.total,
        }
    }
}
