// Text search over titles, descriptions and tag names

use rusqlite::Connection;
use crate::error::Result;
use crate::models::Todo;
use crate::priority;
use crate::repo::TodoRepo;

/// Find todos whose title, description or any tag name contains `query`
/// (case-insensitive). Results are unique by id and in priority order.
pub fn search(conn: &Connection, query: &str) -> Result<Vec<Todo>> {
    let needle = query.to_lowercase();
    log::debug!("Searching todos for '{}'", needle);

    // Each todo is visited once, so matching on any field keeps ids unique
    let matches: Vec<Todo> = TodoRepo::list_all(conn)?
        .into_iter()
        .filter(|todo| matches(todo, &needle))
        .collect();

    Ok(priority::sorted(matches))
}

/// `needle` must already be lowercase
pub fn matches(todo: &Todo, needle: &str) -> bool {
    todo.title.to_lowercase().contains(needle)
        || todo
            .description
            .as_deref()
            .map_or(false, |d| d.to_lowercase().contains(needle))
        || todo.tags.iter().any(|tag| tag.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Effort, Urgency};

    fn todo(title: &str, description: Option<&str>, tags: &[&str]) -> Todo {
        Todo {
            id: 1,
            title: title.to_string(),
            description: description.map(str::to_string),
            deadline: None,
            urgency: Urgency::default(),
            effort: Effort::default(),
            completed: false,
            parent_id: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_ts: 0,
            modified_ts: 0,
        }
    }

    #[test]
    fn test_matches_title_case_insensitive() {
        assert!(matches(&todo("Call the BANK", None, &[]), "bank"));
    }

    #[test]
    fn test_matches_description() {
        assert!(matches(&todo("Errand", Some("Pick up Groceries"), &[]), "groceries"));
    }

    #[test]
    fn test_matches_tag_only() {
        assert!(matches(&todo("Errand", None, &["urgent"]), "urgent"));
        assert!(matches(&todo("Errand", None, &["urgent"]), "urg"));
    }

    #[test]
    fn test_no_match() {
        assert!(!matches(&todo("Errand", Some("shop"), &["home"]), "work"));
    }

    #[test]
    fn test_empty_needle_matches_everything() {
        assert!(matches(&todo("Anything", None, &[]), ""));
    }
}
