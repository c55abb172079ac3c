//! Key-limit pagination
//!
//! The lower limit counts OIDs to skip, the upper limit OIDs to return.
//! Both are counted per OID across the whole scan (or per key, when the
//! plan asks for a reset between keys).

use crate::observability::{log_event, Event};
use crate::plan::{KeyInfo, KeyLimitOrigin, RegExpr, ValDescr, ValueFetch};
use crate::scan::{ScanError, ScanResult};
use crate::value::coerce_to_bigint;

/// What to do with the next candidate OID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    /// Still inside the lower limit; drop it.
    Skip,
    Emit,
    /// Upper limit reached; the search is over.
    Stop,
}

/// Evaluated key limits. `None` means no limit on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyLimits {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

impl KeyLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn is_unlimited(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Evaluate the plan's limit expressions.
    ///
    /// A negative user limit is an error. A negative optimizer-derived
    /// upper limit becomes 0; a negative derived lower limit is folded into
    /// the upper limit (floored at 0) and replaced by 0.
    pub fn evaluate(info: &KeyInfo, fetch: &dyn ValueFetch, vd: &ValDescr) -> ScanResult<Self> {
        let lower = eval_limit(info.limit_lower.as_ref(), fetch, vd)?;
        let upper = eval_limit(info.limit_upper.as_ref(), fetch, vd)?;

        if info.limit_origin == KeyLimitOrigin::User {
            if let Some(v) = lower.filter(|v| *v < 0).or(upper.filter(|v| *v < 0)) {
                return Err(ScanError::invalid_key_limit(v));
            }
            return Ok(Self { lower, upper });
        }

        let mut limits = Self {
            lower,
            upper: upper.map(|u| u.max(0)),
        };

        if let Some(l) = lower.filter(|l| *l < 0) {
            if let Some(u) = limits.upper.filter(|u| *u > 0) {
                limits.upper = Some((u + l).max(0));
            }
            limits.lower = Some(0);

            let lower_field = l.to_string();
            let upper_field = limits.upper.map_or("none".to_string(), |u| u.to_string());
            log_event(
                Event::KeyLimitNormalized,
                &[("lower", lower_field.as_str()), ("upper", upper_field.as_str())],
            );
        }

        Ok(limits)
    }

    /// Re-arm the upper limit for the next key of a key list.
    ///
    /// Applies only when the plan requests it and there is an upper but no
    /// lower limit. Returns whether the limits were re-evaluated.
    pub fn reset_for_next_key(
        &mut self,
        info: &KeyInfo,
        fetch: &dyn ValueFetch,
        vd: &ValDescr,
    ) -> ScanResult<bool> {
        if !info.limit_reset || self.upper.is_none() || self.lower.is_some() {
            return Ok(false);
        }
        *self = Self::evaluate(info, fetch, vd)?;
        Ok(true)
    }

    /// Account for one candidate OID.
    pub fn admit(&mut self) -> LimitDecision {
        if let Some(lower) = self.lower.as_mut() {
            if *lower > 0 {
                *lower -= 1;
                return LimitDecision::Skip;
            }
        }

        if let Some(upper) = self.upper.as_mut() {
            if *upper <= 0 {
                return LimitDecision::Stop;
            }
            *upper -= 1;
        }

        LimitDecision::Emit
    }

    /// The upper limit is used up.
    pub fn exhausted(&self) -> bool {
        matches!(self.upper, Some(u) if u <= 0)
    }
}

fn eval_limit(
    expr: Option<&RegExpr>,
    fetch: &dyn ValueFetch,
    vd: &ValDescr,
) -> ScanResult<Option<i64>> {
    let Some(expr) = expr else {
        return Ok(None);
    };
    let value = fetch.peek(expr, vd)?;
    Ok(Some(coerce_to_bigint(&value)?))
}
