//! Cursor state shared by every scan kind

use std::fmt;

/// Result of a successful cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCode {
    /// A row is in the value list.
    Success,
    /// No more rows in this direction or block.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Opened,
    Started,
    Ended,
    Closed,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanStatus::Opened => "opened",
            ScanStatus::Started => "started",
            ScanStatus::Ended => "ended",
            ScanStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPosition {
    Before,
    On,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanDirection {
    #[default]
    Forward,
    Backward,
}

impl ScanDirection {
    pub fn is_forward(self) -> bool {
        self == ScanDirection::Forward
    }

    pub fn reversed(self) -> Self {
        match self {
            ScanDirection::Forward => ScanDirection::Backward,
            ScanDirection::Backward => ScanDirection::Forward,
        }
    }
}

/// Join-level single-fetch behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleFetch {
    /// Plain scan.
    #[default]
    NoSingleInner,
    /// At most one row; a NULL row stands in when nothing matches.
    SingleOuter,
    /// At most one row, nothing when nothing matches.
    SingleInner,
    /// Every matching row, or one NULL row when nothing matches.
    NoSingleOuter,
}

/// What the statement does with the rows it reads. Update and delete
/// lock every qualified object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOp {
    #[default]
    Select,
    Update,
    Delete,
}

impl ScanOp {
    pub fn locks_rows(self) -> bool {
        !matches!(self, ScanOp::Select)
    }
}

/// Leaf kind of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    Heap,
    HeapPage,
    ClassAttr,
    Index,
    IndexKeyInfo,
    IndexNodeInfo,
    List,
    Show,
    Values,
    Set,
    JsonTable,
    Method,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Heap => "heap",
            ScanType::HeapPage => "heap_page",
            ScanType::ClassAttr => "class_attr",
            ScanType::Index => "index",
            ScanType::IndexKeyInfo => "index_key_info",
            ScanType::IndexNodeInfo => "index_node_info",
            ScanType::List => "list",
            ScanType::Show => "show",
            ScanType::Values => "values",
            ScanType::Set => "set",
            ScanType::JsonTable => "json_table",
            ScanType::Method => "method",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Saved position of a list-file scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPos {
    pub(crate) status: ScanStatus,
    pub(crate) position: ScanPosition,
    pub(crate) tuple: Option<usize>,
}
