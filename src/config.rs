use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

pub const DEFAULT_CLOSING_STATUSES: [&str; 2] = ["closed", "deleted"];

/// `owner/repo` coordinate of the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(AppError::Configuration(format!(
                "repository must look like owner/repo, got '{value}'"
            ))),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub repository: Repository,
    pub user: String,
    pub extra_labels: Vec<String>,
    pub translation_file: Option<PathBuf>,
    pub closing_statuses: Vec<String>,
    pub start_id: Option<u64>,
    pub max_tickets: Option<usize>,
    pub create_labels: bool,
    pub dry_run: bool,
}

impl MigrationConfig {
    /// Defaults for everything except the repository: the user is the
    /// repository owner and the closing statuses are `closed` and `deleted`.
    pub fn new(repository: Repository) -> Self {
        Self {
            user: repository.owner.clone(),
            repository,
            extra_labels: Vec::new(),
            translation_file: None,
            closing_statuses: default_closing_statuses(),
            start_id: None,
            max_tickets: None,
            create_labels: true,
            dry_run: false,
        }
    }
}

pub fn default_closing_statuses() -> Vec<String> {
    DEFAULT_CLOSING_STATUSES
        .iter()
        .map(|status| status.to_string())
        .collect()
}
