//! JSON file request source.
//!
//! Reads a document shaped like the service's list response
//! (`{"approvalRequests": [...]}`) or a bare JSON array. The file is re-read
//! on every call so that a listing after a decision sees the new state.
//! Decisions are written back atomically (temp file + rename).

use crate::approval::types::{Action, ApprovalRequest};
use crate::source::{apply_action, classify_status, paginate, validate_name};
use crate::source::{Page, RequestSource, SourceError, StateFilter, DEFAULT_PAGE_SIZE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Bare(Vec<ApprovalRequest>),
    Listing {
        #[serde(rename = "approvalRequests", default)]
        approval_requests: Vec<ApprovalRequest>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingOut<'a> {
    approval_requests: &'a [ApprovalRequest],
}

pub struct JsonFileSource {
    path: PathBuf,
    page_size: usize,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<ApprovalRequest>, SourceError> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| SourceError::from_io(self.path_str(), e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: Document = serde_json::from_str(&content).map_err(|e| SourceError::Parse {
            path: self.path_str(),
            source: e,
        })?;
        Ok(match doc {
            Document::Bare(requests) => requests,
            Document::Listing { approval_requests } => approval_requests,
        })
    }

    fn store(&self, requests: &[ApprovalRequest]) -> Result<(), SourceError> {
        let json = serde_json::to_string_pretty(&ListingOut {
            approval_requests: requests,
        })
        .map_err(|e| SourceError::Parse {
            path: self.path_str(),
            source: e,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| SourceError::from_io(tmp.display().to_string(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| SourceError::from_io(self.path_str(), e))?;
        Ok(())
    }

    fn decide(
        &mut self,
        name: &str,
        action: Action,
        expire_time: Option<DateTime<Utc>>,
    ) -> Result<ApprovalRequest, SourceError> {
        validate_name(name)?;
        let mut requests = self.load()?;
        let request = requests
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| classify_status(404, name))?;
        apply_action(request, action, expire_time, Utc::now())?;
        let updated = request.clone();
        self.store(&requests)?;
        tracing::debug!(name, %action, path = %self.path.display(), "decision written");
        Ok(updated)
    }
}

impl RequestSource for JsonFileSource {
    fn list_page(
        &self,
        filter: StateFilter,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<Page, SourceError> {
        let requests = self.load()?;
        paginate(requests.iter(), filter, page_size, page_token)
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn get(&self, name: &str) -> Result<ApprovalRequest, SourceError> {
        validate_name(name)?;
        self.load()?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| classify_status(404, name))
    }

    fn approve(
        &mut self,
        name: &str,
        expire_time: Option<DateTime<Utc>>,
    ) -> Result<ApprovalRequest, SourceError> {
        self.decide(name, Action::Approve, expire_time)
    }

    fn dismiss(&mut self, name: &str) -> Result<ApprovalRequest, SourceError> {
        self.decide(name, Action::Dismiss, None)
    }

    fn revoke(&mut self, name: &str) -> Result<ApprovalRequest, SourceError> {
        self.decide(name, Action::Revoke, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::types::RequestState;
    use tempfile::TempDir;

    const LISTING: &str = r#"{
        "approvalRequests": [
            {"name": "projects/p/approvalRequests/one", "state": "PENDING"},
            {"name": "projects/p/approvalRequests/two"},
            {"name": "projects/p/approvalRequests/three", "state": "APPROVED"}
        ]
    }"#;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("requests.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reads_listing_document() {
        let tmp = TempDir::new().unwrap();
        let src = JsonFileSource::new(write(&tmp, LISTING));
        let pending = src.list(StateFilter::Pending).unwrap();
        // "two" has no state and counts as pending
        assert_eq!(pending.len(), 2);
        assert_eq!(src.list(StateFilter::All).unwrap().len(), 3);
    }

    #[test]
    fn test_reads_bare_array_and_empty_file() {
        let tmp = TempDir::new().unwrap();
        let src = JsonFileSource::new(write(&tmp, r#"[{"name": "a/b"}]"#));
        assert_eq!(src.list(StateFilter::All).unwrap().len(), 1);

        let src = JsonFileSource::new(write(&tmp, "  "));
        assert!(src.list(StateFilter::All).unwrap().is_empty());

        let src = JsonFileSource::new(write(&tmp, "{}"));
        assert!(src.list(StateFilter::All).unwrap().is_empty());
    }

    #[test]
    fn test_decision_persists() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, LISTING);
        let mut src = JsonFileSource::new(&path);
        let updated = src.approve("projects/p/approvalRequests/two", None).unwrap();
        assert_eq!(updated.state, Some(RequestState::Approved));

        let reread = JsonFileSource::new(&path);
        let got = reread.get("projects/p/approvalRequests/two").unwrap();
        assert_eq!(got.state, Some(RequestState::Approved));
        assert!(!tmp.path().join("requests.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let src = JsonFileSource::new(tmp.path().join("missing.json"));
        assert!(matches!(
            src.list(StateFilter::All),
            Err(SourceError::Io { .. })
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let src = JsonFileSource::new(write(&tmp, "not json"));
        assert!(matches!(
            src.list(StateFilter::All),
            Err(SourceError::Parse { .. })
        ));
    }
}
