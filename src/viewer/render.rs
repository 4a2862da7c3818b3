//! Draws the three viewer panes from a [`ViewerState`].
//!
//! ```text
//! ┌── Requests ──┐┌──────── Request Details ─────────┐
//! │ abcd1234     ││ Basic Information:               │
//! │ efgh5678     ││   Name: projects/…/abcd1234      │
//! └──────────────┘└──────────────────────────────────┘
//! ↑/↓: Navigate | q: Quit | a: Approve | d: Dismiss | r: Revoke
//! ```
//!
//! Rendering keeps no state between frames. Text is clipped to its pane;
//! a pane whose backend calls fail is reported and the remaining panes are
//! still drawn.

use crate::approval::types::ApprovalRequest;
use crate::viewer::diagnostics::{Diagnostic, DiagnosticSink, Pane};
use crate::viewer::target::{Region, RenderError, RenderTarget, Size, Style};
use crate::viewer::viewport::ViewerState;
use std::borrow::Cow;

pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 8;
pub const STATUS_HEIGHT: u16 = 1;
const MIN_LIST_WIDTH: u16 = 30;
const MAX_LIST_WIDTH: u16 = 50;
/// Columns between the detail pane border and its content.
const DETAIL_INDENT: u16 = 1;
const ELLIPSIS: &str = "...";

pub const STATUS_LEGEND: &str = "↑/↓: Navigate | q: Quit | a: Approve | d: Dismiss | r: Revoke";

/// Pane placement for a given terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub list: Region,
    pub detail: Region,
    pub status: Region,
}

impl Layout {
    pub fn new(size: Size) -> Self {
        let main_height = size.height.saturating_sub(STATUS_HEIGHT);
        let list_width = (size.width / 3).clamp(MIN_LIST_WIDTH, MAX_LIST_WIDTH).min(size.width);
        Self {
            list: Region::new(0, 0, list_width, main_height),
            detail: Region::new(0, list_width, size.width - list_width, main_height),
            status: Region::new(main_height, 0, size.width, size.height - main_height),
        }
    }
}

/// How many list rows fit at this size.
pub fn visible_rows_for(size: Size) -> usize {
    (size.height.saturating_sub(STATUS_HEIGHT).saturating_sub(2) as usize).max(1)
}

pub fn fits(size: Size) -> bool {
    size.width >= MIN_WIDTH && size.height >= MIN_HEIGHT
}

/// Shorten `text` to at most `max` characters, ending in `...` when cut.
pub fn clip_text(text: &str, max: usize) -> Cow<'_, str> {
    if text.chars().count() <= max {
        return Cow::Borrowed(text);
    }
    if max <= ELLIPSIS.len() {
        return Cow::Owned(".".repeat(max));
    }
    let mut clipped: String = text.chars().take(max - ELLIPSIS.len()).collect();
    clipped.push_str(ELLIPSIS);
    Cow::Owned(clipped)
}

/// Word-wrap `text` into lines of at most `width` characters.
///
/// Breaks at the last space within the limit, or hard-breaks a word that is
/// longer than the whole line. Whitespace runs at break points are dropped
/// and other whitespace (tabs, newlines) becomes a plain space.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if width == 0 {
        return lines;
    }
    let normalized: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    let mut rest = normalized.trim();
    while !rest.is_empty() {
        let Some((limit, at_limit)) = rest.char_indices().nth(width) else {
            lines.push(rest.to_string());
            break;
        };
        // A space right at the limit still leaves a full-width line before it.
        let window = &rest[..limit + at_limit.len_utf8()];
        let (line, next) = match window.rfind(' ').filter(|&i| i > 0) {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (&rest[..limit], &rest[limit..]),
        };
        lines.push(line.trim_end().to_string());
        rest = next.trim_start();
    }
    lines
}

/// Write clipped to `region`. Anything starting outside it is dropped.
fn put(
    target: &mut dyn RenderTarget,
    region: Region,
    row: u16,
    col: u16,
    text: &str,
    style: Style,
) -> Result<(), RenderError> {
    if !region.contains(row, col) {
        return Ok(());
    }
    let available = (region.right() - col) as usize;
    target.write_text(row, col, &clip_text(text, available), style)
}

fn put_centered(
    target: &mut dyn RenderTarget,
    region: Region,
    row: u16,
    text: &str,
    style: Style,
) -> Result<(), RenderError> {
    let len = text.chars().count() as u16;
    let col = region.col + region.width.saturating_sub(len) / 2;
    put(target, region, row, col, text, style)
}

fn draw_frame(
    target: &mut dyn RenderTarget,
    region: Region,
    title: &str,
) -> Result<(), RenderError> {
    target.clear(region)?;
    target.draw_border(region)?;
    put_centered(target, region, region.row, &format!(" {} ", title), Style::Header)
}

pub fn draw_list_pane(
    state: &ViewerState,
    target: &mut dyn RenderTarget,
    region: Region,
) -> Result<(), RenderError> {
    draw_frame(target, region, "Requests")?;
    let inner = region.inner();

    if state.is_empty() {
        let row = inner.row + inner.height / 2;
        return put_centered(target, inner, row, "No requests found", Style::Normal);
    }

    let width = inner.width as usize;
    for (offset, (idx, request)) in state.visible().enumerate() {
        let row = inner.row + offset as u16;
        if row >= inner.bottom() {
            break;
        }
        let label = format!(" {} ", request.short_id());
        let label = clip_text(&label, width);
        // Pad to the full width so the highlight spans the row
        let line = format!("{:<width$}", label, width = width);
        let style = if idx == state.selected_index() {
            Style::Highlight
        } else {
            Style::Normal
        };
        put(target, inner, row, inner.col, &line, style)?;
    }
    Ok(())
}

/// Fields shown in the detail pane, grouped into titled sections.
pub fn detail_sections(request: &ApprovalRequest) -> Vec<(&'static str, Vec<(String, String)>)> {
    let mut sections = vec![
        (
            "Basic Information",
            vec![
                ("Name".to_string(), request.name.clone()),
                ("State".to_string(), request.display_state()),
                ("Request Time".to_string(), request.formatted_request_time()),
            ],
        ),
        (
            "Resource Details",
            vec![("Resource".to_string(), request.resource_name().to_string())],
        ),
        (
            "Request Context",
            vec![
                ("Type".to_string(), request.reason_type().to_string()),
                ("Detail".to_string(), request.reason_detail().to_string()),
            ],
        ),
    ];

    let locations: Vec<(String, String)> = request
        .location_rows()
        .into_iter()
        .map(|(label, value)| (label, value.into_owned()))
        .collect();
    if !locations.is_empty() {
        sections.push(("Locations", locations));
    }
    sections
}

pub fn draw_detail_pane(
    state: &ViewerState,
    target: &mut dyn RenderTarget,
    region: Region,
) -> Result<(), RenderError> {
    draw_frame(target, region, "Request Details")?;
    let inner = region.inner();

    let Some(request) = state.selected() else {
        let row = inner.row + inner.height / 2;
        return put_centered(target, inner, row, "No request selected", Style::Normal);
    };

    let col = inner.col + DETAIL_INDENT;
    let content_width = inner.width.saturating_sub(2 * DETAIL_INDENT);
    let bottom = inner.bottom();
    let mut row = inner.row;

    'sections: for (title, items) in detail_sections(request) {
        if row >= bottom {
            break;
        }
        put(target, inner, row, col, &format!("{}:", title), Style::Header)?;
        row += 1;

        for (label, value) in items {
            if row >= bottom {
                break 'sections;
            }
            let label = format!("{}: ", label);
            let label_len = label.chars().count() as u16;
            put(target, inner, row, col + 2, &label, Style::Normal)?;

            let mut value_col = col + 2 + label_len;
            let mut available = content_width.saturating_sub(2 + label_len) as usize;
            if available == 0 && !value.trim().is_empty() {
                // No room beside the label: the value goes on the next row
                row += 1;
                value_col = col + 2;
                available = content_width.saturating_sub(2) as usize;
            }
            let lines = wrap_text(&value, available);
            if lines.is_empty() {
                row += 1;
                continue;
            }
            for line in lines {
                if row >= bottom {
                    break 'sections;
                }
                put(target, inner, row, value_col, &line, Style::Normal)?;
                row += 1;
            }
        }
        row += 1;
    }
    Ok(())
}

/// The key legend, preceded by the last notice when there is one.
pub fn draw_status_pane(
    state: &ViewerState,
    target: &mut dyn RenderTarget,
    region: Region,
) -> Result<(), RenderError> {
    target.clear(region)?;
    let line = match state.notice() {
        Some(notice) => Cow::Owned(format!("{} | {}", notice, STATUS_LEGEND)),
        None => Cow::Borrowed(STATUS_LEGEND),
    };
    put(target, region, region.row, region.col + 1, &line, Style::Bold)
}

/// Draw every pane and present the frame.
///
/// Each pane is attempted even if an earlier one failed. Failures go to
/// `sink`; the first one is returned so the loop can redraw.
pub fn render_frame(
    state: &ViewerState,
    target: &mut dyn RenderTarget,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), RenderError> {
    let layout = Layout::new(target.size()?);
    let mut first_error = None;

    for pane in [Pane::List, Pane::Detail, Pane::Status] {
        let result = match pane {
            Pane::List => draw_list_pane(state, target, layout.list),
            Pane::Detail => draw_detail_pane(state, target, layout.detail),
            Pane::Status => draw_status_pane(state, target, layout.status),
        };
        if let Err(err) = result {
            sink.record(Diagnostic::RenderFailed {
                pane: Some(pane),
                error: err.to_string(),
            });
            first_error.get_or_insert(err);
        }
    }

    if let Err(err) = target.present() {
        sink.record(Diagnostic::RenderFailed {
            pane: None,
            error: err.to_string(),
        });
        first_error.get_or_insert(err);
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
