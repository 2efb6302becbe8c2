/// One tracker selected out of an export, fully materialised.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    pub name: String,
    pub categories: Vec<Category>,
    pub groups: Vec<Group>,
    pub statuses: Vec<Status>,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: String,
    pub name: String,
}

/// A source ticket. Optional fields are `None` when the export carries no
/// text for them, which is distinct from an empty string.
#[derive(Debug, Clone, Default)]
pub struct Ticket {
    pub id: String,
    pub category_id: Option<String>,
    pub group_id: Option<String>,
    pub status_id: Option<String>,
    pub submitter: Option<String>,
    pub summary: String,
    pub details: Option<String>,
    pub url: Option<String>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default)]
pub struct Comment {
    pub id: String,
    pub submitter: Option<String>,
    pub details: Option<String>,
}

impl Tracker {
    /// Status ids whose name, lowercased, is one of `closing_statuses`.
    pub fn closed_status_ids(&self, closing_statuses: &[String]) -> Vec<String> {
        let closing = closing_statuses
            .iter()
            .map(|status| status.to_lowercase())
            .collect::<Vec<_>>();
        self.statuses
            .iter()
            .filter(|status| closing.contains(&status.name.to_lowercase()))
            .map(|status| status.id.clone())
            .collect()
    }
}
