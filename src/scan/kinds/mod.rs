//! Leaf scan kinds
//!
//! Each kind owns only its own state and reaches the shared cursor state
//! through [`CursorCore`]. The cursor dispatches by matching on
//! [`ScanKind`].

mod class_attr;
mod heap;
mod heap_page;
mod index;
mod index_info;
mod json_table;
mod list;
mod row_source;
mod set;
mod values;

pub(crate) use class_attr::ClassAttrScan;
pub(crate) use heap::HeapScan;
pub(crate) use heap_page::HeapPageScan;
pub(crate) use index::IndexScan;
pub(crate) use index_info::{IndexKeyInfoScan, IndexNodeInfoScan};
pub(crate) use json_table::JsonTableScan;
pub(crate) use list::ListScan;
pub(crate) use row_source::{MethodScan, ShowScan};
pub(crate) use set::SetScan;
pub(crate) use values::ValuesScan;

use super::cursor::CursorCore;
use super::errors::ScanResult;
use super::state::{ScanCode, ScanPosition, ScanType};

/// Operations every leaf kind provides to the cursor.
pub(crate) trait LeafScan: Send {
    fn start(&mut self, _core: &mut CursorCore) -> ScanResult<()> {
        Ok(())
    }

    /// Produce the next qualified row into the value list.
    fn next(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode>;

    /// Rewind to the start of the current block.
    fn reset_block(&mut self, core: &mut CursorCore) -> ScanResult<()> {
        core.position = ScanPosition::Before;
        Ok(())
    }

    /// Move to the next block. Ungrouped kinds have a single block.
    fn next_block(&mut self, core: &mut CursorCore) -> ScanResult<ScanCode> {
        Ok(if core.position == ScanPosition::Before {
            ScanCode::Success
        } else {
            ScanCode::End
        })
    }

    fn end(&mut self, _core: &mut CursorCore) {}

    /// Release buffers and collaborator resources.
    fn close(&mut self) {}
}

pub(crate) enum ScanKind {
    Heap(HeapScan),
    HeapPage(HeapPageScan),
    ClassAttr(ClassAttrScan),
    Index(IndexScan),
    IndexKeyInfo(IndexKeyInfoScan),
    IndexNodeInfo(IndexNodeInfoScan),
    List(ListScan),
    Show(ShowScan),
    Values(ValuesScan),
    Set(SetScan),
    JsonTable(JsonTableScan),
    Method(MethodScan),
}

impl ScanKind {
    pub(crate) fn leaf(&mut self) -> &mut dyn LeafScan {
        match self {
            ScanKind::Heap(s) => s,
            ScanKind::HeapPage(s) => s,
            ScanKind::ClassAttr(s) => s,
            ScanKind::Index(s) => s,
            ScanKind::IndexKeyInfo(s) => s,
            ScanKind::IndexNodeInfo(s) => s,
            ScanKind::List(s) => s,
            ScanKind::Show(s) => s,
            ScanKind::Values(s) => s,
            ScanKind::Set(s) => s,
            ScanKind::JsonTable(s) => s,
            ScanKind::Method(s) => s,
        }
    }

    pub(crate) fn scan_type(&self) -> ScanType {
        match self {
            ScanKind::Heap(_) => ScanType::Heap,
            ScanKind::HeapPage(_) => ScanType::HeapPage,
            ScanKind::ClassAttr(_) => ScanType::ClassAttr,
            ScanKind::Index(_) => ScanType::Index,
            ScanKind::IndexKeyInfo(_) => ScanType::IndexKeyInfo,
            ScanKind::IndexNodeInfo(_) => ScanType::IndexNodeInfo,
            ScanKind::List(_) => ScanType::List,
            ScanKind::Show(_) => ScanType::Show,
            ScanKind::Values(_) => ScanType::Values,
            ScanKind::Set(_) => ScanType::Set,
            ScanKind::JsonTable(_) => ScanType::JsonTable,
            ScanKind::Method(_) => ScanType::Method,
        }
    }
}

/// Position inside an in-memory sequence of rows, driven by the cursor
/// position: `Before` restarts at the first row.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RowWalk {
    current: Option<usize>,
}

impl RowWalk {
    /// Index of the next candidate, or `None` once past the end.
    pub(crate) fn advance(&mut self, position: ScanPosition, len: usize) -> Option<usize> {
        let next = match position {
            ScanPosition::Before => 0,
            ScanPosition::On => self.current.map_or(0, |c| c + 1),
            ScanPosition::After => return None,
        };
        if next < len {
            self.current = Some(next);
            Some(next)
        } else {
            self.current = Some(len);
            None
        }
    }

    pub(crate) fn current(&self) -> Option<usize> {
        self.current
    }

    pub(crate) fn reset(&mut self) {
        self.current = None;
    }
}
