use serde::{Deserialize, Serialize};
use crate::error::{Result, TodoError};

/// Tag model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A tag and the number of todos bearing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Normalize a tag name (trim, lowercase) and validate its charset
///
/// Accepts an optional leading `+` so command-line style tags (`+work`) can be
/// passed straight through.
pub fn normalize_tag_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let name = name.strip_prefix('+').unwrap_or(name).to_lowercase();

    if name.is_empty() {
        return Err(TodoError::validation("Tag cannot be empty"));
    }

    // Tag charset: ASCII letters and digits plus '_', '-', '.'
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.') {
        Ok(name)
    } else {
        Err(TodoError::validation(format!(
            "Invalid tag: '{}'. Tags can only contain ASCII letters, numbers, underscores, hyphens, and dots.",
            raw.trim()
        )))
    }
}

/// Normalize a list of tag names, dropping duplicates. Result is sorted.
pub fn normalize_tag_names<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    let mut names = raw
        .iter()
        .map(|t| normalize_tag_name(t.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    names.sort();
    names.dedup();
    Ok(names)
}
