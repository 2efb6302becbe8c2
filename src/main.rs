mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cmd::inspect::{self, LabelsArgs, TrackersArgs};
use crate::cmd::migrate::{self, MigrateArgs};
use crate::error::AppResult;

#[derive(Parser)]
#[command(
    name = "sf2gh",
    author,
    version,
    about = "Migrate SourceForge tracker exports to GitHub issues"
)]
struct Cli {
    /// Log request details.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate one tracker's tickets and follow-ups into GitHub issues.
    Migrate(MigrateArgs),
    /// List the trackers contained in an export.
    Trackers(TrackersArgs),
    /// Show how categories and groups translate into labels.
    Labels(LabelsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Trackers(args) => inspect::trackers(args),
        Commands::Labels(args) => inspect::labels(args),
        Commands::Migrate(args) => {
            let Some(report) = migrate::run(args).await? else {
                println!("Aborted.");
                std::process::exit(1);
            };
            let verb = if report.dry_run {
                "planned, nothing sent"
            } else {
                "migrated"
            };
            println!(
                "Done. {} issues {verb} ({} closed, {} comments), {} tickets skipped, {} labels created, {} already present.",
                report.tickets.len(),
                report.issues_closed,
                report.comments_created,
                report.tickets_skipped,
                report.labels_created,
                report.labels_existing
            );
            if report.limit_reached {
                println!("Stopped at the configured ticket limit.");
            }
            Ok(())
        }
    }
}
