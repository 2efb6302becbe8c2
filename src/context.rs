use std::sync::Arc;

use crate::config::MigrationConfig;
use crate::services::IssueTrackerService;

#[derive(Clone)]
pub struct AppContext {
    pub config: MigrationConfig,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
}

impl AppContext {
    pub fn new(config: MigrationConfig, issue_tracker: Arc<dyn IssueTrackerService>) -> Self {
        Self {
            config,
            issue_tracker,
        }
    }
}
