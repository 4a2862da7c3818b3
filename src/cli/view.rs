//! `accessctl view` — the interactive browser.
//!
//! Each viewer session ends with either a quit or a chosen action. Actions
//! are carried out with the terminal restored, then the listing is fetched
//! again and a new session resumes with the same selection. The outcome is
//! shown in the status pane of the resumed session.

use crate::approval::types::ActionSelection;
use crate::cli::{act::print_outcome, source_error};
use crate::source::{perform, RequestSource, StateFilter};
use crate::viewer::{self, TracingSink, Viewer, ViewerError};
use anyhow::{Context, Result};
use colored::Colorize;

pub fn run_view(source: &mut dyn RequestSource, state: StateFilter) -> Result<()> {
    let records = source
        .list(state)
        .map_err(|e| source_error(e, format!("Failed to list {} approval requests", state)))?;
    let mut viewer = Viewer::new(records);

    browse(&mut viewer, source, state, &mut |viewer| {
        let mut sink = TracingSink::new();
        viewer.run_in_terminal(&mut sink)
    })
}

/// Run viewer sessions until the user quits, performing each chosen action
/// and refreshing the listing in between. A failed action does not end
/// browsing; its error is reported and shown as the notice.
pub fn browse(
    viewer: &mut Viewer,
    source: &mut dyn RequestSource,
    state: StateFilter,
    session: &mut dyn FnMut(&mut Viewer) -> Result<Option<ActionSelection>, ViewerError>,
) -> Result<()> {
    loop {
        let selection = session(viewer).context("Interactive viewer failed")?;
        let Some(selection) = selection else {
            return Ok(());
        };

        let id = selection.request.short_id().to_string();
        let notice = match perform(source, &selection) {
            Ok(updated) => {
                print_outcome(selection.action, &updated);
                format!("✓ Request {} {}", id, selection.action.past_tense())
            }
            Err(err) => {
                let notice = format!("✗ Failed to {} {}: {}", selection.action, id, err);
                let err = source_error(err, format!("Failed to {} {}", selection.action, id));
                eprintln!("  {} {:#}", "✗".red().bold(), err);
                notice
            }
        };

        let records = source
            .list(state)
            .map_err(|e| source_error(e, "Failed to refresh approval requests".to_string()))?;
        viewer::refresh(viewer, records);
        viewer.set_notice(notice);
    }
}
