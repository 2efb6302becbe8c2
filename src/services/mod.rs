pub mod issue_tracker;

pub use issue_tracker::{CreatedIssue, IssueDraft, IssueTrackerService, LabelOutcome};
