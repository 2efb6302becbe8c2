use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::domain::tracker::{Category, Group};
use crate::error::{AppError, AppResult};

static LABEL_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w._()]+").expect("label pattern is valid"));

/// Normalizes a label the way the target service constrains label names:
/// runs of characters outside word characters, `.`, `_`, `(` and `)` become
/// one space, and trailing spaces are dropped. Case is preserved.
pub fn labelify(name: &str) -> String {
    LABEL_DISALLOWED
        .replace_all(name, " ")
        .trim_end_matches(' ')
        .to_string()
}

/// User-supplied overrides, keyed by the source category/group name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationTable {
    #[serde(default)]
    pub categories: HashMap<String, Option<LabelTarget>>,
    #[serde(default)]
    pub groups: HashMap<String, Option<LabelTarget>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LabelTarget {
    Single(String),
    Many(Vec<Option<String>>),
}

impl LabelTarget {
    fn into_labels(self) -> Vec<String> {
        match self {
            LabelTarget::Single(label) => vec![label],
            LabelTarget::Many(labels) => labels.into_iter().flatten().collect(),
        }
    }
}

impl TranslationTable {
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AppError::Configuration(format!(
                "cannot read translation file {}: {err}",
                path.display()
            ))
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            AppError::Configuration(format!(
                "invalid translation file {}: {err}",
                path.display()
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    pub name: String,
    pub labels: Vec<String>,
}

/// Resolved label universe for one run. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct LabelTranslationMap {
    categories: HashMap<String, LabelEntry>,
    groups: HashMap<String, LabelEntry>,
    labels: Vec<String>,
}

impl LabelTranslationMap {
    pub fn resolve(
        categories: &[Category],
        groups: &[Group],
        table: Option<&TranslationTable>,
        extra_labels: &[String],
    ) -> Self {
        let mut labels = LabelSet::default();

        let categories = resolve_axis(
            categories.iter().map(|c| (c.id.as_str(), c.name.as_str())),
            table.map(|t| &t.categories),
            &mut labels,
        );
        let groups = resolve_axis(
            groups.iter().map(|g| (g.id.as_str(), g.name.as_str())),
            table.map(|t| &t.groups),
            &mut labels,
        );
        for extra in extra_labels {
            labels.insert(labelify(extra));
        }

        Self {
            categories,
            groups,
            labels: labels.into_vec(),
        }
    }

    /// Every label that must exist remotely, in first-seen order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels for a category id. Unknown or absent ids yield no labels.
    pub fn category_labels(&self, id: Option<&str>) -> &[String] {
        id.and_then(|id| self.categories.get(id))
            .map(|entry| entry.labels.as_slice())
            .unwrap_or(&[])
    }

    /// Labels for a group id. Unknown or absent ids yield no labels.
    pub fn group_labels(&self, id: Option<&str>) -> &[String] {
        id.and_then(|id| self.groups.get(id))
            .map(|entry| entry.labels.as_slice())
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = (&String, &LabelEntry)> {
        self.categories.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &LabelEntry)> {
        self.groups.iter()
    }
}

fn resolve_axis<'a>(
    items: impl Iterator<Item = (&'a str, &'a str)>,
    overrides: Option<&HashMap<String, Option<LabelTarget>>>,
    labels: &mut LabelSet,
) -> HashMap<String, LabelEntry> {
    let mut resolved = HashMap::new();
    for (id, name) in items {
        let targets = match overrides.and_then(|table| table.get(name)) {
            Some(Some(target)) => target.clone().into_labels(),
            Some(None) => Vec::new(),
            None => vec![name.to_string()],
        };

        let mut entry_labels = LabelSet::default();
        for target in targets {
            let label = labelify(&target);
            entry_labels.insert(label.clone());
            labels.insert(label);
        }

        resolved.insert(
            id.to_string(),
            LabelEntry {
                name: name.to_string(),
                labels: entry_labels.into_vec(),
            },
        );
    }
    resolved
}

/// Ordered, duplicate-free label list. Empty labels are never kept.
#[derive(Debug, Default)]
pub struct LabelSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl LabelSet {
    pub fn insert(&mut self, label: String) {
        if label.is_empty() || self.seen.contains(&label) {
            return;
        }
        self.seen.insert(label.clone());
        self.ordered.push(label);
    }

    pub fn extend<'a>(&mut self, labels: impl IntoIterator<Item = &'a String>) {
        for label in labels {
            self.insert(label.clone());
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}
