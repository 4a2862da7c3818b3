//! Diagnostics reported by the viewer while it owns the terminal.
//!
//! Writing log lines to stderr during a session would scribble over the
//! alternate screen, so the loop reports into an injected [`DiagnosticSink`]
//! instead. [`TracingSink`] holds events until the session ends and then
//! hands them to `tracing`.

use std::fmt;

/// Which pane a render event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    List,
    Detail,
    Status,
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pane::List => write!(f, "list"),
            Pane::Detail => write!(f, "detail"),
            Pane::Status => write!(f, "status"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    SessionStarted { records: usize, width: u16, height: u16 },
    Resized { width: u16, height: u16, visible_rows: usize },
    RenderFailed { pane: Option<Pane>, error: String },
    /// A render kept failing and the loop moved on to reading input.
    RenderRetriesExhausted { attempts: usize },
    ActionIgnored { key: char },
    SessionEnded { outcome: String },
}

pub trait DiagnosticSink {
    fn record(&mut self, diagnostic: Diagnostic);

    /// Called once when the session ends.
    fn flush(&mut self) {}
}

/// Buffers diagnostics and forwards them to `tracing` on flush.
#[derive(Debug, Default)]
pub struct TracingSink {
    pending: Vec<Diagnostic>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for TracingSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.pending.push(diagnostic);
    }

    fn flush(&mut self) {
        for d in self.pending.drain(..) {
            match d {
                Diagnostic::SessionStarted {
                    records,
                    width,
                    height,
                } => tracing::debug!(records, width, height, "viewer session started"),
                Diagnostic::Resized {
                    width,
                    height,
                    visible_rows,
                } => tracing::debug!(width, height, visible_rows, "terminal resized"),
                Diagnostic::RenderFailed { pane, error } => match pane {
                    Some(pane) => tracing::warn!(%pane, %error, "render failed"),
                    None => tracing::warn!(%error, "frame present failed"),
                },
                Diagnostic::RenderRetriesExhausted { attempts } => {
                    tracing::warn!(attempts, "giving up on redraw until next key")
                }
                Diagnostic::ActionIgnored { key } => {
                    tracing::debug!(%key, "action key ignored: no requests")
                }
                Diagnostic::SessionEnded { outcome } => {
                    tracing::debug!(%outcome, "viewer session ended")
                }
            }
        }
    }
}

impl Drop for TracingSink {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Keeps every diagnostic (for testing).
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<Diagnostic>,
    pub flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_failures(&self) -> usize {
        self.events
            .iter()
            .filter(|d| matches!(d, Diagnostic::RenderFailed { .. }))
            .count()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.events.push(diagnostic);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_sink_drains_on_flush() {
        let mut sink = TracingSink::new();
        sink.record(Diagnostic::ActionIgnored { key: 'a' });
        sink.record(Diagnostic::RenderFailed {
            pane: Some(Pane::List),
            error: "boom".to_string(),
        });
        assert_eq!(sink.pending.len(), 2);
        sink.flush();
        assert!(sink.pending.is_empty());
    }

    #[test]
    fn test_memory_sink_counts_failures() {
        let mut sink = MemorySink::new();
        sink.record(Diagnostic::RenderFailed {
            pane: None,
            error: "x".to_string(),
        });
        sink.record(Diagnostic::ActionIgnored { key: 'd' });
        assert_eq!(sink.render_failures(), 1);
    }
}
