//! Error types for request sources.
//!
//! Every failure a source reports is funneled through [`classify_status`],
//! so approve, dismiss and revoke share one mapping from service status
//! codes to error kinds.

use thiserror::Error;

const SERVICE_DISABLED_HELP: &str = "The Access Approval API is not enabled for this project. To enable it:\n\
     1. Visit https://console.cloud.google.com/apis/library/accessapproval.googleapis.com\n\
     2. Select your project and click 'Enable'\n\
     3. Wait a few minutes for the change to take effect, then retry";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("approval request not found: {0}")]
    NotFound(String),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("service disabled: {message}\n{help}")]
    ServiceDisabled { message: String, help: &'static str },

    #[error("approval service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Classify a service failure by HTTP status code.
pub fn classify_status(status: u16, message: impl Into<String>) -> SourceError {
    let message = message.into();
    if message.contains("SERVICE_DISABLED") {
        return SourceError::ServiceDisabled {
            message,
            help: SERVICE_DISABLED_HELP,
        };
    }
    match status {
        400 => SourceError::Malformed(message),
        403 => SourceError::PermissionDenied(message),
        404 => SourceError::NotFound(message),
        409 => SourceError::Conflict(message),
        _ => SourceError::Api { status, message },
    }
}

impl SourceError {
    /// Map a local I/O failure onto the service taxonomy where one fits.
    pub fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => {
                classify_status(403, format!("{}: {}", path, source))
            }
            _ => SourceError::Io { path, source },
        }
    }

    /// Status code this error corresponds to, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Malformed(_) => Some(400),
            SourceError::PermissionDenied(_) | SourceError::ServiceDisabled { .. } => Some(403),
            SourceError::NotFound(_) => Some(404),
            SourceError::Conflict(_) => Some(409),
            SourceError::Api { status, .. } => Some(*status),
            SourceError::Io { .. } | SourceError::Parse { .. } => None,
        }
    }

    /// One-line suggestion shown under the error in the CLI.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SourceError::PermissionDenied(_) => {
                Some("Check that your account holds the Access Approval Approver role")
            }
            SourceError::NotFound(_) => Some("The request may have expired; list requests again"),
            SourceError::Conflict(_) => {
                Some("The request was already decided; refresh to see its current state")
            }
            SourceError::Malformed(_) => Some("Check the request id and parent resource"),
            _ => None,
        }
    }
}
