use std::fmt;

use tracing::{error, info, warn};

use crate::config::MigrationConfig;
use crate::context::AppContext;
use crate::domain::body::{comment_body, issue_body, preview};
use crate::domain::labels::{LabelSet, LabelTranslationMap, TranslationTable, labelify};
use crate::domain::tracker::{Ticket, Tracker};
use crate::error::{AppError, AppResult};
use crate::services::{IssueDraft, LabelOutcome};

pub const LABEL_COLOR: &str = "FFFFFF";

const DRY_RUN_ISSUE_NUMBER: u64 = 0;
const PREVIEW_LIMIT: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    Init,
    LabelResolution,
    LabelEnsured,
    TicketIteration,
    Done,
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::LabelResolution => write!(f, "label resolution"),
            Self::LabelEnsured => write!(f, "label creation"),
            Self::TicketIteration => write!(f, "ticket iteration"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Everything decided about one ticket before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPlan {
    pub ticket_id: String,
    pub title: String,
    pub labels: Vec<String>,
    pub closed: bool,
    pub body: String,
    pub comments: Vec<CommentPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPlan {
    pub comment_id: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct MigratedTicket {
    pub plan: TicketPlan,
    pub issue_number: u64,
}

/// Counts of what the run did. With `dry_run` set, closes and comments are
/// the planned ones; nothing was sent.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub dry_run: bool,
    pub labels_created: usize,
    pub labels_existing: usize,
    pub tickets_skipped: usize,
    pub tickets: Vec<MigratedTicket>,
    pub issues_closed: usize,
    pub comments_created: usize,
    pub limit_reached: bool,
}

impl MigrationReport {
    fn record(&mut self, ticket: MigratedTicket) {
        if ticket.plan.closed {
            self.issues_closed += 1;
        }
        self.comments_created += ticket.plan.comments.len();
        self.tickets.push(ticket);
    }
}

/// Resume threshold and ticket limit, checked before a ticket starts and
/// after it has been fully migrated.
struct TicketWindow {
    start_id: Option<u64>,
    max_tickets: Option<usize>,
    processed: usize,
}

impl TicketWindow {
    fn new(config: &MigrationConfig) -> Self {
        Self {
            start_id: config.start_id,
            max_tickets: config.max_tickets,
            processed: 0,
        }
    }

    /// Every ticket id must be numeric once a threshold is set, checked
    /// before anything is sent.
    fn check_ids(&self, tickets: &[Ticket]) -> AppResult<()> {
        for ticket in tickets {
            self.admits(ticket)?;
        }
        Ok(())
    }

    fn admits(&self, ticket: &Ticket) -> AppResult<bool> {
        let Some(start_id) = self.start_id else {
            return Ok(true);
        };
        let id = ticket.id.trim().parse::<u64>().map_err(|_| {
            AppError::MalformedExport(format!("ticket id '{}' is not numeric", ticket.id))
        })?;
        Ok(id >= start_id)
    }

    fn limit_reached(&self) -> bool {
        self.max_tickets
            .is_some_and(|max_tickets| self.processed >= max_tickets)
    }

    fn finish_ticket(&mut self) -> bool {
        self.processed += 1;
        self.limit_reached()
    }
}

pub async fn migrate_tracker(
    ctx: &AppContext,
    tracker: &Tracker,
    table: Option<&TranslationTable>,
) -> AppResult<MigrationReport> {
    let config = &ctx.config;
    let mut report = MigrationReport {
        dry_run: config.dry_run,
        ..MigrationReport::default()
    };

    info!(phase = %MigrationPhase::Init, tracker = %tracker.name, tickets = tracker.tickets.len());
    let mut window = TicketWindow::new(config);
    window.check_ids(&tracker.tickets)?;
    let closed_status_ids = tracker.closed_status_ids(&config.closing_statuses);

    info!(phase = %MigrationPhase::LabelResolution);
    let labels = LabelTranslationMap::resolve(
        &tracker.categories,
        &tracker.groups,
        table,
        &config.extra_labels,
    );
    info!(labels = ?labels.labels(), "resolved labels");

    if config.create_labels {
        info!(phase = %MigrationPhase::LabelEnsured);
        ensure_labels(ctx, labels.labels(), &mut report).await?;
    } else {
        info!("label creation disabled, assuming labels exist");
    }

    info!(phase = %MigrationPhase::TicketIteration);
    let extra_labels = config
        .extra_labels
        .iter()
        .map(|label| labelify(label))
        .collect::<Vec<_>>();
    let total = tracker.tickets.len();

    for (index, ticket) in tracker.tickets.iter().enumerate() {
        let position = format!("[{}/{}]", index + 1, total);
        if window.limit_reached() {
            report.limit_reached = true;
            break;
        }
        if !window.admits(ticket)? {
            info!(ticket = %ticket.id, %position, "skipping ticket");
            report.tickets_skipped += 1;
            continue;
        }

        let plan = plan_ticket(ticket, &labels, &extra_labels, &closed_status_ids);
        let migrated = migrate_ticket(ctx, plan, &position).await.map_err(|err| {
            error!(ticket = %ticket.id, "migration halted: {err}");
            AppError::for_ticket(&ticket.id, err)
        })?;
        report.record(migrated);

        if window.finish_ticket() {
            info!(processed = window.processed, "ticket limit reached");
            report.limit_reached = true;
            break;
        }
    }

    info!(phase = %MigrationPhase::Done, migrated = report.tickets.len(), skipped = report.tickets_skipped);
    Ok(report)
}

async fn ensure_labels(
    ctx: &AppContext,
    labels: &[String],
    report: &mut MigrationReport,
) -> AppResult<()> {
    let total = labels.len();
    for (index, label) in labels.iter().enumerate() {
        info!(%label, "creating label [{}/{}]", index + 1, total);
        if ctx.config.dry_run {
            continue;
        }
        let outcome: LabelOutcome = ctx.issue_tracker.create_label(label, LABEL_COLOR).await?;
        if outcome.created() {
            report.labels_created += 1;
        } else {
            warn!(%label, "label already exists");
            report.labels_existing += 1;
        }
    }
    Ok(())
}

pub fn plan_ticket(
    ticket: &Ticket,
    labels: &LabelTranslationMap,
    extra_labels: &[String],
    closed_status_ids: &[String],
) -> TicketPlan {
    let mut ticket_labels = LabelSet::default();
    ticket_labels.extend(labels.category_labels(ticket.category_id.as_deref()));
    ticket_labels.extend(labels.group_labels(ticket.group_id.as_deref()));
    ticket_labels.extend(extra_labels);

    let closed = ticket
        .status_id
        .as_ref()
        .is_some_and(|status_id| closed_status_ids.contains(status_id));

    TicketPlan {
        ticket_id: ticket.id.clone(),
        title: ticket.summary.clone(),
        labels: ticket_labels.into_vec(),
        closed,
        body: issue_body(ticket),
        comments: ticket
            .comments
            .iter()
            .map(|comment| CommentPlan {
                comment_id: comment.id.clone(),
                body: comment_body(comment),
            })
            .collect(),
    }
}

async fn migrate_ticket(
    ctx: &AppContext,
    plan: TicketPlan,
    position: &str,
) -> AppResult<MigratedTicket> {
    let dry_run = ctx.config.dry_run;
    info!(ticket = %plan.ticket_id, %position, "start ticket");
    info!(title = %plan.title, labels = ?plan.labels, closed = plan.closed);
    info!(body = %preview(&plan.body, PREVIEW_LIMIT));

    let issue_number = if dry_run {
        DRY_RUN_ISSUE_NUMBER
    } else {
        let draft = IssueDraft {
            title: plan.title.clone(),
            body: plan.body.clone(),
            labels: plan.labels.clone(),
        };
        ctx.issue_tracker.create_issue(&draft).await?.number
    };
    info!(issue = issue_number, "issue created");

    if plan.closed {
        if !dry_run {
            ctx.issue_tracker.close_issue(issue_number).await?;
        }
        info!(issue = issue_number, "issue closed");
    }

    let total = plan.comments.len();
    for (index, comment) in plan.comments.iter().enumerate() {
        info!(
            issue = issue_number,
            comment = %comment.comment_id,
            body = %preview(&comment.body, PREVIEW_LIMIT),
            "comment [{}/{}]",
            index + 1,
            total
        );
        if !dry_run {
            ctx.issue_tracker
                .create_comment(issue_number, &comment.body)
                .await?;
        }
    }

    info!(ticket = %plan.ticket_id, %position, "end ticket");
    Ok(MigratedTicket { plan, issue_number })
}
