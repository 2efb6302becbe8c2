use std::sync::LazyLock;

use regex::Regex;

use crate::domain::tracker::{Comment, Ticket};

const ANONYMOUS_SUBMITTER: &str = "nobody";

static BOILERPLATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Logged In: (?:YES|NO)|user_id=\d+|Originator: (?:YES|NO))[ \t]*\r?$")
        .expect("boilerplate pattern is valid")
});

/// Removes the login/submitter/originator lines the source tracker prepends
/// to posted text. Only lines at the very start are removed.
pub fn strip_boilerplate(text: &str) -> &str {
    let mut rest = text;
    loop {
        let (line, remainder) = match rest.split_once('\n') {
            Some((line, remainder)) => (line, remainder),
            None => (rest, ""),
        };
        if line.is_empty() || !BOILERPLATE_LINE.is_match(line) {
            return rest;
        }
        rest = remainder;
    }
}

pub fn issue_body(ticket: &Ticket) -> String {
    let submitter = ticket.submitter.as_deref().unwrap_or(ANONYMOUS_SUBMITTER);
    let details = strip_boilerplate(ticket.details.as_deref().unwrap_or_default());

    let mut body = format!(
        "[Issue migrated from SourceForge, id '{}', submitted by '{}'.]\n",
        ticket.id, submitter
    );
    if let Some(url) = &ticket.url {
        body.push_str(&format!("[{url}]\n"));
    }
    body.push('\n');
    body.push_str(details);
    body
}

pub fn comment_body(comment: &Comment) -> String {
    let submitter = comment.submitter.as_deref().unwrap_or(ANONYMOUS_SUBMITTER);
    let details = strip_boilerplate(comment.details.as_deref().unwrap_or_default());
    format!("[Comment migrated from SourceForge, submitted by '{submitter}'.]\n\n{details}")
}

/// Single-line preview used in log output.
pub fn preview(body: &str, limit: usize) -> String {
    let flat = body.replace('\n', " ");
    match flat.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
