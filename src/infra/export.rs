use std::fs;
use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};

use crate::domain::tracker::{Category, Comment, Group, Status, Ticket, Tracker};
use crate::error::{AppError, AppResult};

/// Reads an export file and materialises the tracker named `tracker_name`.
pub fn load_tracker(path: &Path, tracker_name: &str) -> AppResult<Tracker> {
    let xml = fs::read_to_string(path)?;
    parse_tracker(&xml, tracker_name)
}

/// Names of every tracker in an export file, in document order.
pub fn list_trackers(path: &Path) -> AppResult<Vec<String>> {
    let xml = fs::read_to_string(path)?;
    let doc = parse_document(&xml)?;
    tracker_nodes(&doc)?
        .map(|tracker| required_text(tracker, "name", "tracker"))
        .collect()
}

pub fn parse_tracker(xml: &str, tracker_name: &str) -> AppResult<Tracker> {
    let doc = parse_document(xml)?;
    let node = tracker_nodes(&doc)?
        .find(|tracker| text(*tracker, "name").as_deref() == Some(tracker_name))
        .ok_or_else(|| AppError::NotFound(tracker_name.to_string()))?;

    Ok(Tracker {
        name: tracker_name.to_string(),
        categories: items(node, "categories", "category")
            .map(|category| {
                Ok(Category {
                    id: required_text(category, "id", "category")?,
                    name: text(category, "category_name").unwrap_or_default(),
                })
            })
            .collect::<AppResult<_>>()?,
        groups: items(node, "groups", "group")
            .map(|group| {
                Ok(Group {
                    id: required_text(group, "id", "group")?,
                    name: text(group, "group_name").unwrap_or_default(),
                })
            })
            .collect::<AppResult<_>>()?,
        statuses: items(node, "statuses", "status")
            .map(|status| {
                Ok(Status {
                    id: required_text(status, "id", "status")?,
                    name: text(status, "name").unwrap_or_default(),
                })
            })
            .collect::<AppResult<_>>()?,
        tickets: items(node, "tracker_items", "tracker_item")
            .map(parse_ticket)
            .collect::<AppResult<_>>()?,
    })
}

fn parse_document(xml: &str) -> AppResult<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(xml, options)
        .map_err(|err| AppError::MalformedExport(format!("invalid XML: {err}")))
}

fn tracker_nodes<'a, 'input>(
    doc: &'a Document<'input>,
) -> AppResult<impl Iterator<Item = Node<'a, 'input>>> {
    let root = doc.root_element();
    if !root.has_tag_name("document") {
        return Err(AppError::MalformedExport(format!(
            "expected <document> root, found <{}>",
            root.tag_name().name()
        )));
    }
    let trackers = child(root, "trackers")
        .ok_or_else(|| AppError::MalformedExport("missing <trackers> section".to_string()))?;
    Ok(children(trackers, "tracker"))
}

fn parse_ticket(item: Node) -> AppResult<Ticket> {
    let id = required_text(item, "id", "tracker_item")?;
    let summary = text(item, "summary").ok_or_else(|| {
        AppError::MalformedExport(format!("tracker_item '{id}' has no <summary>"))
    })?;
    let comments = items(item, "followups", "followup")
        .map(|followup| {
            Ok(Comment {
                id: required_text(followup, "id", "followup")?,
                submitter: text(followup, "submitter"),
                details: text(followup, "details"),
            })
        })
        .collect::<AppResult<_>>()?;

    Ok(Ticket {
        category_id: text(item, "category_id"),
        group_id: text(item, "group_id"),
        status_id: text(item, "status_id"),
        submitter: text(item, "submitter"),
        summary,
        details: text(item, "details"),
        url: text(item, "url"),
        comments,
        id,
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(name))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(name))
}

/// Entries of a `<container><entry/>...</container>` list. A missing
/// container is an empty list.
fn items<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    container: &str,
    entry: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    child(node, container)
        .into_iter()
        .flat_map(move |list| children(list, entry))
}

/// Text content of a direct child element. `None` when the element is absent
/// or carries no text at all.
fn text(node: Node, name: &str) -> Option<String> {
    let element = child(node, name)?;
    let mut content = None::<String>;
    for piece in element.descendants().filter(|n| n.is_text()) {
        if let Some(piece) = piece.text() {
            content.get_or_insert_with(String::new).push_str(piece);
        }
    }
    content
}

fn required_text(node: Node, name: &str, owner: &str) -> AppResult<String> {
    text(node, name)
        .ok_or_else(|| AppError::MalformedExport(format!("<{owner}> is missing <{name}>")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document>
  <trackers>
    <tracker>
      <name>Feature Requests</name>
      <categories/>
      <tracker_items/>
    </tracker>
    <tracker>
      <name>Bugs</name>
      <categories>
        <category><id>1</id><category_name>crash</category_name></category>
        <category><id>2</id><category_name></category_name></category>
      </categories>
      <groups>
        <group><id>10</id><group_name>v1.0</group_name></group>
      </groups>
      <statuses>
        <status><id>1</id><name>Open</name></status>
        <status><id>2</id><name>Closed</name></status>
      </statuses>
      <tracker_items>
        <tracker_item>
          <id>5</id>
          <category_id>1</category_id>
          <group_id>10</group_id>
          <status_id>2</status_id>
          <submitter>alice</submitter>
          <summary>App crashes</summary>
          <details><![CDATA[It crashes <on> start]]></details>
          <url>http://x/5</url>
          <followups>
            <followup><id>50</id><submitter>bob</submitter><details>Confirmed</details></followup>
            <followup><id>51</id><submitter>carol</submitter><details>Fixed</details></followup>
          </followups>
        </tracker_item>
        <tracker_item>
          <id>3</id>
          <summary>Older ticket</summary>
          <details></details>
        </tracker_item>
      </tracker_items>
    </tracker>
  </trackers>
</document>"#;

    #[test]
    fn selects_tracker_by_exact_name() {
        let tracker = parse_tracker(EXPORT, "Bugs").unwrap();
        assert_eq!(tracker.name, "Bugs");
        assert_eq!(tracker.categories.len(), 2);
        assert_eq!(tracker.categories[1].name, "");
        assert_eq!(tracker.groups[0].name, "v1.0");
        assert_eq!(tracker.statuses[1].name, "Closed");
    }

    #[test]
    fn unknown_tracker_is_not_found() {
        let err = parse_tracker(EXPORT, "bugs").unwrap_err();
        assert!(matches!(err, AppError::NotFound(name) if name == "bugs"));
    }

    #[test]
    fn tickets_keep_export_order_and_comments() {
        let tracker = parse_tracker(EXPORT, "Bugs").unwrap();
        let ids = tracker.tickets.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["5", "3"]);

        let ticket = &tracker.tickets[0];
        assert_eq!(ticket.category_id.as_deref(), Some("1"));
        assert_eq!(ticket.status_id.as_deref(), Some("2"));
        assert_eq!(ticket.details.as_deref(), Some("It crashes <on> start"));
        let submitters = ticket
            .comments
            .iter()
            .map(|c| c.submitter.as_deref().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(submitters, vec!["bob", "carol"]);
    }

    #[test]
    fn absent_text_is_distinct_from_present_text() {
        let tracker = parse_tracker(EXPORT, "Bugs").unwrap();
        let ticket = &tracker.tickets[1];
        assert_eq!(ticket.details, None);
        assert_eq!(ticket.submitter, None);
        assert_eq!(ticket.category_id, None);
        assert!(ticket.comments.is_empty());
    }

    #[test]
    fn missing_summary_is_malformed() {
        let xml = r#"<document><trackers><tracker><name>Bugs</name>
            <tracker_items><tracker_item><id>1</id></tracker_item></tracker_items>
            </tracker></trackers></document>"#;
        let err = parse_tracker(xml, "Bugs").unwrap_err();
        assert!(matches!(err, AppError::MalformedExport(msg) if msg.contains("'1'")));
    }

    #[test]
    fn accepts_export_with_doctype() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE document SYSTEM "http://sourceforge.net/export/sf_export.dtd">
<document><trackers><tracker><name>Bugs</name>
  <tracker_items><tracker_item><id>1</id><summary>Boot fails</summary></tracker_item></tracker_items>
</tracker></trackers></document>"#;
        let tracker = parse_tracker(xml, "Bugs").unwrap();
        assert_eq!(tracker.tickets.len(), 1);
        assert_eq!(tracker.tickets[0].summary, "Boot fails");
    }

    #[test]
    fn missing_trackers_section_is_malformed() {
        let err = parse_tracker("<document/>", "Bugs").unwrap_err();
        assert!(matches!(err, AppError::MalformedExport(_)));
    }

    #[test]
    fn lists_tracker_names_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let names = list_trackers(file.path()).unwrap();
        assert_eq!(names, vec!["Feature Requests".to_string(), "Bugs".to_string()]);

        let tracker = load_tracker(file.path(), "Feature Requests").unwrap();
        assert!(tracker.tickets.is_empty());
    }
}
