//! Display helpers shared by the CLI listing and the terminal viewer.

use crate::approval::types::ApprovalRequest;
use chrono::{DateTime, Utc};
use std::borrow::Cow;

/// Placeholder for fields the service left out.
pub const MISSING: &str = "N/A";

/// Format an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
/// Falls back to the input unchanged when it doesn't parse.
pub fn format_timestamp(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Turn a location attribute key into a readable label.
/// `principalOfficeCountry` becomes `Principal Office Country`.
pub fn location_label(key: &str) -> String {
    key.replace("principal", "Principal ")
        .replace("Country", " Country")
}

impl ApprovalRequest {
    /// Trailing segment of the resource name.
    pub fn short_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// State as shown to the user; a missing state is shown as `N/A`.
    pub fn display_state(&self) -> String {
        self.state
            .map(|s| s.to_string())
            .unwrap_or_else(|| MISSING.to_string())
    }

    pub fn formatted_request_time(&self) -> String {
        self.request_time
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| MISSING.to_string())
    }

    pub fn formatted_expire_time(&self) -> String {
        self.expire_time()
            .map(format_timestamp)
            .unwrap_or_else(|| MISSING.to_string())
    }

    pub fn resource_name(&self) -> &str {
        self.requested_resource_name.as_deref().unwrap_or(MISSING)
    }

    pub fn reason_type(&self) -> &str {
        self.requested_reason
            .as_ref()
            .map(|r| r.reason_type.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(MISSING)
    }

    pub fn reason_detail(&self) -> &str {
        self.requested_reason
            .as_ref()
            .and_then(|r| r.detail.as_deref())
            .unwrap_or(MISSING)
    }

    /// Location attributes as (label, value) pairs, in service order.
    /// Empty when the request carries no locations.
    pub fn location_rows(&self) -> Vec<(String, Cow<'_, str>)> {
        let Some(locations) = &self.requested_locations else {
            return Vec::new();
        };
        locations
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => Cow::Borrowed(s.as_str()),
                    other => Cow::Owned(other.to_string()),
                };
                (location_label(key), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::types::{RequestState, RequestedReason};

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2025-02-18T10:30:00Z"),
            "2025-02-18 10:30:00 UTC"
        );
        assert_eq!(
            format_timestamp("2025-02-18T12:30:00.123456+02:00"),
            "2025-02-18 10:30:00 UTC"
        );
        assert_eq!(format_timestamp("invalid-timestamp"), "invalid-timestamp");
    }

    #[test]
    fn test_short_id() {
        let req = ApprovalRequest::new("projects/123/approvalRequests/abcd1234");
        assert_eq!(req.short_id(), "abcd1234");
        assert_eq!(ApprovalRequest::new("plain").short_id(), "plain");
    }

    #[test]
    fn test_display_state() {
        let mut req = ApprovalRequest::new("x");
        assert_eq!(req.display_state(), "N/A");
        req.state = Some(RequestState::Approved);
        assert_eq!(req.display_state(), "APPROVED");
    }

    #[test]
    fn test_reason_fields() {
        let mut req = ApprovalRequest::new("x");
        assert_eq!(req.reason_type(), "N/A");
        assert_eq!(req.reason_detail(), "N/A");
        req.requested_reason = Some(RequestedReason {
            reason_type: "CUSTOMER_INITIATED_SUPPORT".to_string(),
            detail: Some("Case number: 12345".to_string()),
        });
        assert_eq!(req.reason_type(), "CUSTOMER_INITIATED_SUPPORT");
        assert_eq!(req.reason_detail(), "Case number: 12345");
    }

    #[test]
    fn test_location_label() {
        let label = location_label("principalCountryCode");
        assert!(label.contains("Principal "));
        assert!(label.contains(" Country"));
        assert_eq!(
            location_label("principalOfficeCountry"),
            "Principal Office Country"
        );
    }

    #[test]
    fn test_location_rows_keep_order() {
        let mut req = ApprovalRequest::new("x");
        assert!(req.location_rows().is_empty());

        let mut map = serde_json::Map::new();
        map.insert("principalPhysicalLocationCountry".into(), "US".into());
        map.insert("principalOfficeCountry".into(), "DE".into());
        req.requested_locations = Some(map);

        let rows = req.location_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "Principal PhysicalLocation Country");
        assert_eq!(rows[0].1, "US");
        assert_eq!(rows[1].1, "DE");
    }
}
