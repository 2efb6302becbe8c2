use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("could not find tracker '{0}'")]
    NotFound(String),
    #[error("malformed export: {0}")]
    MalformedExport(String),
    #[error("issue tracker responded with {status}: {body}")]
    Http { status: u16, body: String },
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("ticket '{ticket_id}' failed: {source}")]
    Ticket {
        ticket_id: String,
        #[source]
        source: Box<AppError>,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn for_ticket(ticket_id: &str, source: AppError) -> Self {
        AppError::Ticket {
            ticket_id: ticket_id.to_string(),
            source: Box::new(source),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
