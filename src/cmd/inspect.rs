use std::path::{Path, PathBuf};

use clap::Args;

use crate::domain::labels::{LabelEntry, LabelTranslationMap, TranslationTable};
use crate::error::AppResult;
use crate::infra::export::{list_trackers, load_tracker};

#[derive(Args, Debug, Clone)]
pub struct TrackersArgs {
    /// SourceForge XML export file.
    pub export: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct LabelsArgs {
    /// SourceForge XML export file.
    pub export: PathBuf,
    /// Name of the tracker, matched exactly.
    pub tracker: String,
    /// JSON file translating category/group names into labels.
    #[arg(short = 't', long = "translations")]
    pub translation_file: Option<PathBuf>,
    /// Extra label applied to all issues (repeatable).
    #[arg(short = 'l', long = "label")]
    pub extra_labels: Vec<String>,
}

pub fn trackers(args: TrackersArgs) -> AppResult<()> {
    for name in list_trackers(&args.export)? {
        println!("{name}");
    }
    Ok(())
}

pub fn labels(args: LabelsArgs) -> AppResult<()> {
    let map = resolve_labels(
        &args.export,
        &args.tracker,
        args.translation_file.as_deref(),
        &args.extra_labels,
    )?;

    println!("Categories:");
    print_entries(map.categories());
    println!("Groups:");
    print_entries(map.groups());
    println!("Labels to create:");
    for label in map.labels() {
        println!("  {label}");
    }
    Ok(())
}

fn resolve_labels(
    export: &Path,
    tracker_name: &str,
    translation_file: Option<&Path>,
    extra_labels: &[String],
) -> AppResult<LabelTranslationMap> {
    let tracker = load_tracker(export, tracker_name)?;
    let table = translation_file.map(TranslationTable::load).transpose()?;
    Ok(LabelTranslationMap::resolve(
        &tracker.categories,
        &tracker.groups,
        table.as_ref(),
        extra_labels,
    ))
}

fn print_entries<'a>(entries: impl Iterator<Item = (&'a String, &'a LabelEntry)>) {
    let mut entries = entries.collect::<Vec<_>>();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (id, entry) in entries {
        let labels = if entry.labels.is_empty() {
            "<no label>".to_string()
        } else {
            entry.labels.join(", ")
        };
        println!("  {id} '{}' -> {labels}", entry.name);
    }
}
