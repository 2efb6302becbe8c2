use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::cmd::prompt;
use crate::config::{MigrationConfig, Repository, default_closing_statuses};
use crate::context::AppContext;
use crate::domain::labels::TranslationTable;
use crate::error::AppResult;
use crate::infra::export::load_tracker;
use crate::infra::github::{DEFAULT_API_URL, GitHubClient};
use crate::workflow::migrate::{MigrationReport, migrate_tracker};

#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// SourceForge XML export file.
    pub export: PathBuf,
    /// Name of the tracker to migrate, matched exactly.
    pub tracker: String,
    /// Target GitHub repository as owner/repo.
    pub repository: String,
    /// User for authentication, if different than the repository owner.
    #[arg(short, long)]
    pub user: Option<String>,
    /// Password or personal access token.
    #[arg(long, env = "SF2GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// GitHub API base URL.
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Extra label to apply to all issues (repeatable).
    #[arg(short = 'l', long = "label")]
    pub extra_labels: Vec<String>,
    /// JSON file translating category/group names into labels.
    #[arg(short = 't', long = "translations")]
    pub translation_file: Option<PathBuf>,
    /// Status that closes the issue (repeatable, defaults to closed and deleted).
    #[arg(short = 'c', long = "closing-status")]
    pub closing_statuses: Vec<String>,
    /// ID of the first ticket to migrate; useful for aborted runs.
    #[arg(short, long = "start")]
    pub start_id: Option<u64>,
    /// Stop after migrating this many tickets.
    #[arg(short, long = "max")]
    pub max_tickets: Option<usize>,
    /// Assume all required labels already exist in the repository.
    #[arg(long)]
    pub no_create_labels: bool,
    /// Only print what would be done.
    #[arg(long)]
    pub dry_run: bool,
    /// Do not ask for confirmation before starting.
    #[arg(short, long)]
    pub yes: bool,
}

impl MigrateArgs {
    pub fn to_config(&self) -> AppResult<MigrationConfig> {
        let repository: Repository = self.repository.parse()?;
        let mut config = MigrationConfig::new(repository);
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        config.extra_labels = self.extra_labels.clone();
        config.translation_file = self.translation_file.clone();
        config.closing_statuses = if self.closing_statuses.is_empty() {
            default_closing_statuses()
        } else {
            self.closing_statuses.clone()
        };
        config.start_id = self.start_id;
        config.max_tickets = self.max_tickets;
        config.create_labels = !self.no_create_labels;
        config.dry_run = self.dry_run;
        Ok(config)
    }
}

/// `Ok(None)` means the user declined to continue.
pub async fn run(args: MigrateArgs) -> AppResult<Option<MigrationReport>> {
    let config = args.to_config()?;
    let tracker = load_tracker(&args.export, &args.tracker)?;
    let table = config
        .translation_file
        .as_deref()
        .map(TranslationTable::load)
        .transpose()?;

    info!(
        tracker = %tracker.name,
        categories = tracker.categories.len(),
        groups = tracker.groups.len(),
        statuses = tracker.statuses.len(),
        tickets = tracker.tickets.len(),
        "loaded export"
    );
    log_options(&config);

    if !args.yes && !prompt::confirm("Shall we continue?")? {
        return Ok(None);
    }

    let token = match (&args.token, config.dry_run) {
        (Some(token), _) => token.clone(),
        (None, true) => String::new(),
        (None, false) => prompt::secret(&format!("{}'s GitHub password or token", config.user))?,
    };

    let client = GitHubClient::new(
        &args.api_url,
        config.repository.clone(),
        &config.user,
        &token,
    );
    let context = AppContext::new(config, Arc::new(client));

    migrate_tracker(&context, &tracker, table.as_ref())
        .await
        .map(Some)
}

fn log_options(config: &MigrationConfig) {
    info!(repository = %config.repository, user = %config.user, "target");
    info!(
        extra_labels = ?config.extra_labels,
        translations = ?config.translation_file,
        closing_statuses = ?config.closing_statuses,
        "labels"
    );
    info!(
        start = ?config.start_id,
        max = ?config.max_tickets,
        create_labels = config.create_labels,
        dry_run = config.dry_run,
        "options"
    );
}
