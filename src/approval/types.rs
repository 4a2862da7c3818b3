//! Types for approval requests as exposed by the approval service.
//!
//! Field names follow the service's JSON (camelCase). Everything is optional
//! except `name`, because the service omits empty fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Pending,
    Approved,
    Dismissed,
    /// Anything the service sends that we don't model.
    #[serde(other)]
    StateUnspecified,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::Pending => write!(f, "PENDING"),
            RequestState::Approved => write!(f, "APPROVED"),
            RequestState::Dismissed => write!(f, "DISMISSED"),
            RequestState::StateUnspecified => write!(f, "STATE_UNSPECIFIED"),
        }
    }
}

/// Why access was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedReason {
    #[serde(rename = "type", default)]
    pub reason_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedExpiration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
}

/// Filled in by the service once a request has been approved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approve_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
}

/// Filled in by the service once a request has been dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismiss_time: Option<String>,
    /// True when the service dismissed the request on its own (e.g. expiry).
    #[serde(default)]
    pub implicit: bool,
}

/// A single approval request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    /// Full resource name, e.g. `projects/123/approvalRequests/abcd`.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RequestState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_expiration: Option<RequestedExpiration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_resource_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_reason: Option<RequestedReason>,

    /// Location attributes, kept in the order the service sent them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_locations: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approve: Option<ApproveDecision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismiss: Option<DismissDecision>,
}

impl ApprovalRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// State used for filtering: a request without a state counts as pending.
    pub fn effective_state(&self) -> RequestState {
        self.state.unwrap_or(RequestState::Pending)
    }

    pub fn expire_time(&self) -> Option<&str> {
        self.requested_expiration
            .as_ref()
            .and_then(|e| e.expire_time.as_deref())
    }
}

/// A state-changing operation the user can pick in the viewer or CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Approve,
    Dismiss,
    Revoke,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Approve => write!(f, "approve"),
            Action::Dismiss => write!(f, "dismiss"),
            Action::Revoke => write!(f, "revoke"),
        }
    }
}

impl Action {
    /// Map a viewer key to its action.
    pub fn from_key(c: char) -> Option<Action> {
        match c {
            'a' => Some(Action::Approve),
            'd' => Some(Action::Dismiss),
            'r' => Some(Action::Revoke),
            _ => None,
        }
    }

    /// Past-tense verb for status output.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::Approve => "approved",
            Action::Dismiss => "dismissed",
            Action::Revoke => "revoked",
        }
    }
}

/// What the viewer hands back when the user picks an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSelection {
    pub action: Action,
    pub request: ApprovalRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_json() {
        let json = r#"{
            "name": "projects/123/approvalRequests/abcd1234",
            "state": "PENDING",
            "requestTime": "2025-02-18T10:30:00Z",
            "requestedResourceName": "//compute.googleapis.com/projects/test",
            "requestedReason": {"type": "CUSTOMER_INITIATED_SUPPORT", "detail": "Case 42"},
            "requestedExpiration": {"expireTime": "2025-02-19T10:30:00Z"},
            "requestedLocations": {"principalPhysicalLocationCountry": "US", "principalOfficeCountry": "DE"}
        }"#;
        let req: ApprovalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.state, Some(RequestState::Pending));
        assert_eq!(req.expire_time(), Some("2025-02-19T10:30:00Z"));
        assert_eq!(
            req.requested_reason.as_ref().unwrap().reason_type,
            "CUSTOMER_INITIATED_SUPPORT"
        );

        // Insertion order is preserved
        let keys: Vec<&String> = req.requested_locations.as_ref().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["principalPhysicalLocationCountry", "principalOfficeCountry"]
        );
    }

    #[test]
    fn test_missing_state_counts_as_pending() {
        let req: ApprovalRequest =
            serde_json::from_str(r#"{"name": "projects/1/approvalRequests/x"}"#).unwrap();
        assert_eq!(req.state, None);
        assert_eq!(req.effective_state(), RequestState::Pending);
    }

    #[test]
    fn test_unknown_state_is_unspecified() {
        let req: ApprovalRequest =
            serde_json::from_str(r#"{"name": "n", "state": "SOMETHING_NEW"}"#).unwrap();
        assert_eq!(req.state, Some(RequestState::StateUnspecified));
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(Action::from_key('a'), Some(Action::Approve));
        assert_eq!(Action::from_key('d'), Some(Action::Dismiss));
        assert_eq!(Action::from_key('r'), Some(Action::Revoke));
        assert_eq!(Action::from_key('q'), None);
        assert_eq!(Action::from_key('A'), None);
    }
}
