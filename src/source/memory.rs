//! In-memory request source (for testing and embedding).

use crate::approval::types::{Action, ApprovalRequest};
use crate::source::{apply_action, classify_status, paginate, validate_name};
use crate::source::{Page, RequestSource, SourceError, StateFilter, DEFAULT_PAGE_SIZE};
use chrono::{DateTime, Utc};

/// Holds requests in a `Vec`, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    requests: Vec<ApprovalRequest>,
    page_size: usize,
}

impl MemorySource {
    pub fn new(requests: Vec<ApprovalRequest>) -> Self {
        Self {
            requests,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn requests(&self) -> &[ApprovalRequest] {
        &self.requests
    }

    fn decide(
        &mut self,
        name: &str,
        action: Action,
        expire_time: Option<DateTime<Utc>>,
    ) -> Result<ApprovalRequest, SourceError> {
        validate_name(name)?;
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| classify_status(404, name))?;
        apply_action(request, action, expire_time, Utc::now())?;
        Ok(request.clone())
    }
}

impl RequestSource for MemorySource {
    fn list_page(
        &self,
        filter: StateFilter,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<Page, SourceError> {
        paginate(self.requests.iter(), filter, page_size, page_token)
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn get(&self, name: &str) -> Result<ApprovalRequest, SourceError> {
        validate_name(name)?;
        self.requests
            .iter()
            .find(|r| r.name == name)
            .cloned()
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

    fn source(n: usize) -> MemorySource {
        let requests = (0..n)
            .map(|i| {
                let mut r = ApprovalRequest::new(format!("projects/p/approvalRequests/r{}", i));
                r.state = Some(RequestState::Pending);
                r
            })
            .collect();
        MemorySource::new(requests)
    }

    #[test]
    fn test_list_follows_pages() {
        let src = source(7).with_page_size(3);
        let all = src.list(StateFilter::Pending).unwrap();
        assert_eq!(all.len(), 7);
        assert_eq!(all[6].short_id(), "r6");
    }

    #[test]
    fn test_dismiss_removes_from_pending() {
        let mut src = source(3);
        src.dismiss("projects/p/approvalRequests/r1").unwrap();
        let pending = src.list(StateFilter::Pending).unwrap();
        assert_eq!(pending.len(), 2);
        let dismissed = src.list(StateFilter::Dismissed).unwrap();
        assert_eq!(dismissed[0].short_id(), "r1");
    }

    #[test]
    fn test_unknown_name_not_found() {
        let mut src = source(1);
        assert!(matches!(
            src.approve("projects/p/approvalRequests/nope", None),
            Err(SourceError::NotFound(_))
        ));
        assert!(matches!(src.get(""), Err(SourceError::Malformed(_))));
    }
}
