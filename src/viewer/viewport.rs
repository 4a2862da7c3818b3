//! Viewer state: the record list, the selection, and the visible window.
//!
//! Invariants, whenever `records` is non-empty:
//!   `top <= selected < len` and `selected < top + visible_rows`.
//! With no records both indices are 0 and nothing is selected.

use crate::approval::types::ApprovalRequest;

#[derive(Debug, Clone)]
pub struct ViewerState {
    records: Vec<ApprovalRequest>,
    selected: usize,
    top: usize,
    visible_rows: usize,
    /// One-line message for the status pane, e.g. the outcome of the last action.
    notice: Option<String>,
}

impl ViewerState {
    pub fn new(records: Vec<ApprovalRequest>, visible_rows: usize) -> Self {
        Self {
            records,
            selected: 0,
            top: 0,
            visible_rows: visible_rows.max(1),
            notice: None,
        }
    }

    pub fn records(&self) -> &[ApprovalRequest] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn top_index(&self) -> usize {
        self.top
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// The highlighted record, if there is one.
    pub fn selected(&self) -> Option<&ApprovalRequest> {
        self.records.get(self.selected)
    }

    /// Records in the visible window, with their absolute index.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &ApprovalRequest)> {
        self.records
            .iter()
            .enumerate()
            .skip(self.top)
            .take(self.visible_rows)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn move_up(&mut self) {
        if self.selected == 0 {
            return;
        }
        self.selected -= 1;
        if self.selected < self.top {
            self.top = self.selected;
        }
    }

    pub fn move_down(&mut self) {
        if self.records.is_empty() || self.selected == self.records.len() - 1 {
            return;
        }
        self.selected += 1;
        if self.selected >= self.top + self.visible_rows {
            self.top += 1;
        }
    }

    /// Swap in a new record set, clamping both indices into range.
    pub fn replace_records(&mut self, records: Vec<ApprovalRequest>) {
        self.records = records;
        let last = self.records.len().saturating_sub(1);
        if self.selected >= self.records.len() {
            self.selected = last;
        }
        if self.top >= self.records.len() {
            self.top = last;
        }
    }

    /// Follow a terminal resize. The window scrolls so the selection stays visible.
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows.max(1);
        if self.selected >= self.top + self.visible_rows {
            self.top = self.selected + 1 - self.visible_rows;
        }
    }
}
