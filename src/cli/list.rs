//! `accessctl list` and `accessctl get` — print approval requests.

use crate::approval::types::ApprovalRequest;
use crate::approval::{display::MISSING, format_timestamp};
use crate::cli::source_error;
use crate::source::{resolve_name, RequestSource, StateFilter};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt::Write as _;
use std::path::Path;

const RULE_WIDTH: usize = 80;

/// Run the `accessctl list` command.
pub fn run_list(
    source: &dyn RequestSource,
    state: StateFilter,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let requests = source
        .list(state)
        .map_err(|e| source_error(e, format!("Failed to list {} approval requests", state)))?;
    tracing::debug!(count = requests.len(), %state, "listed requests");

    if json {
        return export_json(&requests, output);
    }

    if requests.is_empty() {
        println!();
        println!(
            "  {} No approval requests found with state '{}'",
            "ℹ".blue(),
            state
        );
        println!();
        return Ok(());
    }

    print!("{}", format_listing(&requests, state));
    Ok(())
}

/// Run the `accessctl get` command.
pub fn run_get(source: &dyn RequestSource, parent: &str, id: &str) -> Result<()> {
    let name = resolve_name(parent, id);
    let request = source
        .get(&name)
        .map_err(|e| source_error(e, format!("Failed to fetch {}", id)))?;
    print!("{}", format_detail(&request));
    Ok(())
}

/// Write `requests` as pretty JSON to `output`, or stdout when `None`.
pub fn export_json(requests: &[ApprovalRequest], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(requests).context("Failed to serialize requests")?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "  {} Exported {} requests to {}",
                "✓".green(),
                requests.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// The summary block printed for each request in a listing.
pub fn format_request(request: &ApprovalRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Request Name: {}", request.name);
    let _ = writeln!(out, "State: {}", request.display_state());
    let _ = writeln!(out, "Request Time: {}", request.formatted_request_time());
    let _ = writeln!(out, "Requested Resource: {}", request.resource_name());
    let _ = writeln!(out, "Requested Reason: {}", request.reason_type());
    let _ = writeln!(out, "Expiration Time: {}", request.formatted_expire_time());
    out
}

pub fn format_listing(requests: &[ApprovalRequest], state: StateFilter) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "Approval Requests (State: {}):", state);
    let _ = writeln!(out, "{}", rule());
    for request in requests {
        out.push_str(&format_request(request));
        let _ = writeln!(out, "{}", rule());
    }
    out
}

/// Everything we know about one request.
pub fn format_detail(request: &ApprovalRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    out.push_str(&format_request(request));
    let _ = writeln!(out, "Reason Detail: {}", request.reason_detail());

    let locations = request.location_rows();
    if !locations.is_empty() {
        let _ = writeln!(out, "Locations:");
        for (label, value) in locations {
            let _ = writeln!(out, "  {}: {}", label, value);
        }
    }

    if let Some(approve) = &request.approve {
        let approved_at = approve.approve_time.as_deref().map(format_timestamp);
        let expires_at = approve.expire_time.as_deref().map(format_timestamp);
        let _ = writeln!(
            out,
            "Approved: {} (expires {})",
            approved_at.as_deref().unwrap_or(MISSING),
            expires_at.as_deref().unwrap_or(MISSING)
        );
    }
    if let Some(dismiss) = &request.dismiss {
        let dismissed_at = dismiss.dismiss_time.as_deref().map(format_timestamp);
        let _ = writeln!(
            out,
            "Dismissed: {}{}",
            dismissed_at.as_deref().unwrap_or(MISSING),
            if dismiss.implicit { " (implicit)" } else { "" }
        );
    }
    out
}
