//! `accessctl approve`, `dismiss` and `revoke`.

use crate::approval::types::{Action, ApprovalRequest};
use crate::cli::source_error;
use crate::source::{resolve_name, RequestSource};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;

/// Run one decision command against the request `id` under `parent`.
pub fn run_action(
    source: &mut dyn RequestSource,
    parent: &str,
    action: Action,
    id: &str,
    expire: Option<&str>,
) -> Result<()> {
    if expire.is_some() && action != Action::Approve {
        bail!("--expire only applies to approve");
    }
    let expire_time = expire.map(parse_expire).transpose()?;
    let name = resolve_name(parent, id);

    let result = match action {
        Action::Approve => source.approve(&name, expire_time),
        Action::Dismiss => source.dismiss(&name),
        Action::Revoke => source.revoke(&name),
    };
    let updated = result.map_err(|e| source_error(e, format!("Failed to {} {}", action, id)))?;

    print_outcome(action, &updated);
    Ok(())
}

/// Parse an `--expire` value: an RFC 3339 timestamp.
pub fn parse_expire(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value.trim())
        .with_context(|| format!("Invalid expire time '{}': expected RFC 3339", value))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn print_outcome(action: Action, request: &ApprovalRequest) {
    println!();
    println!(
        "  {} Request {} {}",
        "✓".green().bold(),
        request.short_id().bold(),
        action.past_tense()
    );
    println!("  State: {}", request.display_state().cyan());
    if action == Action::Approve {
        println!("  Expires: {}", request.formatted_expire_time());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::types::RequestState;
    use crate::source::MemorySource;

    fn pending(id: &str) -> ApprovalRequest {
        let mut r = ApprovalRequest::new(format!("projects/1/approvalRequests/{}", id));
        r.state = Some(RequestState::Pending);
        r
    }

    #[test]
    fn test_parse_expire() {
        let t = parse_expire("2099-01-01T00:00:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2098-12-31T22:00:00+00:00");
        assert!(parse_expire("tomorrow").is_err());
    }

    #[test]
    fn test_approve_then_revoke() {
        let mut source = MemorySource::new(vec![pending("a1")]);
        run_action(&mut source, "projects/1", Action::Approve, "a1", None).unwrap();
        assert_eq!(
            source.requests()[0].effective_state(),
            RequestState::Approved
        );
        run_action(&mut source, "projects/1", Action::Revoke, "a1", None).unwrap();
        assert_eq!(
            source.requests()[0].effective_state(),
            RequestState::Dismissed
        );
    }

    #[test]
    fn test_expire_rejected_for_dismiss() {
        let mut source = MemorySource::new(vec![pending("a1")]);
        let err = run_action(
            &mut source,
            "projects/1",
            Action::Dismiss,
            "a1",
            Some("2099-01-01T00:00:00Z"),
        );
        assert!(err.is_err());
        assert_eq!(source.requests()[0].effective_state(), RequestState::Pending);
    }

    #[test]
    fn test_unknown_request_fails() {
        let mut source = MemorySource::new(vec![]);
        assert!(run_action(&mut source, "projects/1", Action::Dismiss, "nope", None).is_err());
    }
}
