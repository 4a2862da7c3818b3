//! Interactive list/detail browser for approval requests.
//!
//! The core (state, renderer, loop) depends only on the [`RenderTarget`]
//! and [`KeySource`] traits; the crossterm/ratatui backend lives in
//! [`terminal`].

pub mod diagnostics;
pub mod input;
pub mod render;
pub mod session;
pub mod target;
pub mod terminal;
pub mod viewport;

use crate::approval::types::{ActionSelection, ApprovalRequest};

pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use input::{Key, KeySource, LoopState, ScriptedKeys};
pub use session::{Viewer, ViewerError};
pub use target::{MemoryTarget, RenderTarget};
pub use viewport::ViewerState;

/// Browse `records` on the terminal until the user quits or picks an action.
pub fn run_viewer(
    records: Vec<ApprovalRequest>,
) -> Result<Option<ActionSelection>, ViewerError> {
    let mut viewer = Viewer::new(records);
    let mut sink = TracingSink::new();
    viewer.run_in_terminal(&mut sink)
}

/// Feed a fresh listing into a live viewer between sessions.
pub fn refresh(viewer: &mut Viewer, records: Vec<ApprovalRequest>) {
    viewer.refresh(records);
}
