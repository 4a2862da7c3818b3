//! The viewer session: draw, wait for a key, repeat.
//!
//! A session ends when the user quits, picks an action, or the environment
//! turns out to be unusable (terminal too small, no terminal at all).
//! Render failures never end a session.

use crate::approval::types::{Action, ActionSelection, ApprovalRequest};
use crate::viewer::diagnostics::{Diagnostic, DiagnosticSink};
use crate::viewer::input::{handle_key, Key, KeySource, LoopState};
use crate::viewer::render::{self, MIN_HEIGHT, MIN_WIDTH};
use crate::viewer::target::{RenderError, RenderTarget, Size};
use crate::viewer::terminal::{CrosstermKeys, TerminalSession};
use crate::viewer::viewport::ViewerState;
use thiserror::Error;

/// Consecutive failed draws before the loop stops retrying and waits for input.
pub const MAX_RENDER_RETRIES: usize = 3;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(
        "terminal is {width}x{height}, the viewer needs at least {min_width}x{min_height}"
    )]
    TerminalTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },

    #[error("the viewer needs an interactive terminal on stdin and stdout")]
    NotATerminal,

    #[error("terminal setup failed: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("could not read terminal size: {0}")]
    Size(#[source] RenderError),

    #[error("failed to read key: {0}")]
    Input(#[source] std::io::Error),
}

/// Owns the viewer state across sessions.
///
/// After an action the caller performs it, hands the fresh listing to
/// [`Viewer::refresh`], and calls `run` again to resume browsing.
#[derive(Debug, Clone)]
pub struct Viewer {
    state: ViewerState,
}

impl Viewer {
    pub fn new(records: Vec<ApprovalRequest>) -> Self {
        Self {
            state: ViewerState::new(records, 1),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Replace the record set, keeping the selection in range.
    pub fn refresh(&mut self, records: Vec<ApprovalRequest>) {
        self.state.replace_records(records);
    }

    /// Show `notice` in the status pane until the selection next moves.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.state.set_notice(notice);
    }

    /// Run one session on an arbitrary target and key source.
    ///
    /// Does not flush `sink`; the owner of the terminal does that once the
    /// screen has been restored.
    pub fn run(
        &mut self,
        target: &mut dyn RenderTarget,
        keys: &mut dyn KeySource,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Option<ActionSelection>, ViewerError> {
        let result = self.run_loop(target, keys, sink);
        let outcome = match &result {
            Ok(None) => "quit".to_string(),
            Ok(Some(selection)) => format!("{} {}", selection.action, selection.request.name),
            Err(err) => err.to_string(),
        };
        sink.record(Diagnostic::SessionEnded { outcome });
        result
    }

    /// Run one session on the real terminal. The terminal is restored on
    /// every exit path, then `sink` is flushed.
    pub fn run_in_terminal(
        &mut self,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Option<ActionSelection>, ViewerError> {
        // Signals are hooked before raw mode so an early SIGINT still ends cleanly
        let mut keys = CrosstermKeys::new();
        let result = match TerminalSession::start() {
            Ok(mut session) => self.run(&mut session, &mut keys, sink),
            Err(err) => Err(err),
        };
        sink.flush();
        result
    }

    fn run_loop(
        &mut self,
        target: &mut dyn RenderTarget,
        keys: &mut dyn KeySource,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Option<ActionSelection>, ViewerError> {
        let size = checked_size(target)?;
        self.state.set_visible_rows(render::visible_rows_for(size));
        sink.record(Diagnostic::SessionStarted {
            records: self.state.records().len(),
            width: size.width,
            height: size.height,
        });

        loop {
            self.draw(target, sink)?;

            let key = keys.next_key()?;
            match handle_key(&mut self.state, key) {
                LoopState::Browsing => {
                    if let Key::Char(c) = key {
                        if Action::from_key(c).is_some() {
                            sink.record(Diagnostic::ActionIgnored { key: c });
                        }
                    }
                }
                LoopState::Exited => return Ok(None),
                LoopState::ActionSelected(selection) => return Ok(Some(selection)),
            }
        }
    }

    /// Draw a frame, retrying failed draws a few times.
    fn draw(
        &mut self,
        target: &mut dyn RenderTarget,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), ViewerError> {
        for _ in 0..MAX_RENDER_RETRIES {
            self.sync_size(target, sink)?;
            if render::render_frame(&self.state, target, sink).is_ok() {
                return Ok(());
            }
        }
        sink.record(Diagnostic::RenderRetriesExhausted {
            attempts: MAX_RENDER_RETRIES,
        });
        Ok(())
    }

    fn sync_size(
        &mut self,
        target: &mut dyn RenderTarget,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), ViewerError> {
        let size = checked_size(target)?;
        let rows = render::visible_rows_for(size);
        if rows != self.state.visible_rows() {
            self.state.set_visible_rows(rows);
            sink.record(Diagnostic::Resized {
                width: size.width,
                height: size.height,
                visible_rows: rows,
            });
        }
        Ok(())
    }
}

fn checked_size(target: &mut dyn RenderTarget) -> Result<Size, ViewerError> {
    let size = target.size().map_err(ViewerError::Size)?;
    if !render::fits(size) {
        return Err(ViewerError::TerminalTooSmall {
            width: size.width,
            height: size.height,
            min_width: MIN_WIDTH,
            min_height: MIN_HEIGHT,
        });
    }
    Ok(size)
}
