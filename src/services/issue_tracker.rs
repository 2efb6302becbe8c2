use async_trait::async_trait;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedIssue {
    pub number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOutcome {
    Created,
    AlreadyExists,
}

impl LabelOutcome {
    pub fn created(&self) -> bool {
        matches!(self, LabelOutcome::Created)
    }
}

/// Remote issue tracker bound to one repository and one authenticated session.
///
/// Every failure other than an already-existing label surfaces as an error;
/// implementations never retry.
#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn create_issue(&self, issue: &IssueDraft) -> AppResult<CreatedIssue>;
    async fn close_issue(&self, number: u64) -> AppResult<()>;
    async fn create_comment(&self, number: u64, body: &str) -> AppResult<()>;
    async fn create_label(&self, name: &str, color: &str) -> AppResult<LabelOutcome>;
}
