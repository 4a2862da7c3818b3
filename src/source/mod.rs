//! Request sources — where approval requests come from and where decisions go.
//!
//! The viewer and CLI only talk to the [`RequestSource`] trait. Sources are
//! synchronous: the viewer is never running while a call is in flight.

pub mod errors;
pub mod file;
pub mod memory;

use crate::approval::types::{
    Action, ActionSelection, ApprovalRequest, ApproveDecision, DismissDecision, RequestState,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use errors::{classify_status, SourceError};
pub use file::JsonFileSource;
pub use memory::MemorySource;

/// Page size used when a caller doesn't pick one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Which requests to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    Pending,
    Approved,
    Dismissed,
    All,
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateFilter::Pending => write!(f, "PENDING"),
            StateFilter::Approved => write!(f, "APPROVED"),
            StateFilter::Dismissed => write!(f, "DISMISSED"),
            StateFilter::All => write!(f, "ALL"),
        }
    }
}

impl StateFilter {
    /// Parse a filter from user input. Case-insensitive, accepts a few aliases.
    pub fn from_str_loose(s: &str) -> Option<StateFilter> {
        match s.to_lowercase().trim() {
            "pending" | "open" => Some(StateFilter::Pending),
            "approved" | "active" => Some(StateFilter::Approved),
            "dismissed" | "closed" => Some(StateFilter::Dismissed),
            "all" | "any" => Some(StateFilter::All),
            _ => None,
        }
    }

    /// Requests without a state are treated as pending.
    pub fn matches(&self, request: &ApprovalRequest) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Pending => request.effective_state() == RequestState::Pending,
            StateFilter::Approved => request.effective_state() == RequestState::Approved,
            StateFilter::Dismissed => request.effective_state() == RequestState::Dismissed,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub requests: Vec<ApprovalRequest>,
    pub next_page_token: Option<String>,
}

/// Trait for anything that can list and decide approval requests.
pub trait RequestSource {
    /// Fetch one page of requests matching `filter`.
    fn list_page(
        &self,
        filter: StateFilter,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<Page, SourceError>;

    fn page_size(&self) -> usize {
        DEFAULT_PAGE_SIZE
    }

    /// Fetch every request matching `filter`, following page tokens.
    fn list(&self, filter: StateFilter) -> Result<Vec<ApprovalRequest>, SourceError> {
        let mut requests = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.list_page(filter, self.page_size(), token.as_deref())?;
            tracing::debug!(count = page.requests.len(), "fetched page");
            requests.extend(page.requests);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(requests)
    }

    fn get(&self, name: &str) -> Result<ApprovalRequest, SourceError>;

    /// Approve a pending request. `expire_time` defaults to the requested expiration.
    fn approve(
        &mut self,
        name: &str,
        expire_time: Option<DateTime<Utc>>,
    ) -> Result<ApprovalRequest, SourceError>;

    fn dismiss(&mut self, name: &str) -> Result<ApprovalRequest, SourceError>;

    /// Revoke a previously approved request.
    fn revoke(&mut self, name: &str) -> Result<ApprovalRequest, SourceError>;
}

/// Carry out an action picked in the viewer.
pub fn perform(
    source: &mut dyn RequestSource,
    selection: &ActionSelection,
) -> Result<ApprovalRequest, SourceError> {
    let name = selection.request.name.as_str();
    tracing::info!(action = %selection.action, name, "performing action");
    match selection.action {
        Action::Approve => source.approve(name, None),
        Action::Dismiss => source.dismiss(name),
        Action::Revoke => source.revoke(name),
    }
}

/// Expand a short request id into a full resource name under `parent`.
/// Ids that already contain a `/` are taken as full names.
pub fn resolve_name(parent: &str, id: &str) -> String {
    let id = id.trim();
    if id.contains('/') {
        id.to_string()
    } else {
        format!("{}/approvalRequests/{}", parent.trim_end_matches('/'), id)
    }
}

pub(crate) fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn validate_name(name: &str) -> Result<(), SourceError> {
    if name.trim().is_empty() {
        return Err(classify_status(400, "request name must not be empty"));
    }
    Ok(())
}

/// Apply `action` to `request` as the service would.
///
/// Approve and dismiss only work on pending requests; revoke only on
/// approved ones. A revoked request ends up dismissed.
pub(crate) fn apply_action(
    request: &mut ApprovalRequest,
    action: Action,
    expire_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), SourceError> {
    let current = request.effective_state();
    let required = match action {
        Action::Approve | Action::Dismiss => RequestState::Pending,
        Action::Revoke => RequestState::Approved,
    };
    if current != required {
        return Err(classify_status(
            409,
            format!(
                "cannot {} {}: request is {}, expected {}",
                action,
                request.short_id(),
                current,
                required
            ),
        ));
    }

    match action {
        Action::Approve => {
            if let Some(expire) = expire_time {
                if expire <= now {
                    return Err(classify_status(400, "expire time must be in the future"));
                }
            }
            let expire = expire_time
                .map(timestamp)
                .or_else(|| request.expire_time().map(str::to_string));
            request.state = Some(RequestState::Approved);
            request.approve = Some(ApproveDecision {
                approve_time: Some(timestamp(now)),
                expire_time: expire,
            });
        }
        Action::Dismiss | Action::Revoke => {
            request.state = Some(RequestState::Dismissed);
            request.dismiss = Some(DismissDecision {
                dismiss_time: Some(timestamp(now)),
                implicit: false,
            });
        }
    }
    Ok(())
}

/// Slice a filtered listing into a page. Tokens are stringified offsets.
pub(crate) fn paginate<'a>(
    requests: impl Iterator<Item = &'a ApprovalRequest>,
    filter: StateFilter,
    page_size: usize,
    page_token: Option<&str>,
) -> Result<Page, SourceError> {
    if page_size == 0 {
        return Err(classify_status(400, "page size must be positive"));
    }
    let offset = match page_token {
        None => 0,
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| classify_status(400, format!("invalid page token: {}", token)))?,
    };

    let matching: Vec<&ApprovalRequest> = requests.filter(|r| filter.matches(r)).collect();
    if offset > matching.len() {
        return Err(classify_status(400, format!("invalid page token: {}", offset)));
    }
    let end = (offset + page_size).min(matching.len());
    let next_page_token = (end < matching.len()).then(|| end.to_string());

    Ok(Page {
        requests: matching[offset..end].iter().map(|r| (*r).clone()).collect(),
        next_page_token,
    })
}
