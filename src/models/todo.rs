use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::{Result, TodoError};

/// Allowed effort estimates (Fibonacci sizing)
pub const EFFORT_VALUES: [u8; 7] = [1, 2, 3, 5, 8, 13, 21];

pub const MIN_URGENCY: u8 = 1;
pub const MAX_URGENCY: u8 = 5;

/// Importance rating, 1 (lowest) to 5 (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Urgency(u8);

impl Urgency {
    pub fn new(value: i64) -> Result<Self> {
        if (MIN_URGENCY as i64..=MAX_URGENCY as i64).contains(&value) {
            Ok(Urgency(value as u8))
        } else {
            Err(TodoError::validation(format!(
                "Urgency must be between {} and {}, got {}",
                MIN_URGENCY, MAX_URGENCY, value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency(MIN_URGENCY)
    }
}

impl TryFrom<i64> for Urgency {
    type Error = TodoError;

    fn try_from(value: i64) -> Result<Self> {
        Urgency::new(value)
    }
}

impl From<Urgency> for u8 {
    fn from(urgency: Urgency) -> u8 {
        urgency.0
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relative size estimate restricted to the Fibonacci values in [`EFFORT_VALUES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Effort(u8);

impl Effort {
    pub fn new(value: i64) -> Result<Self> {
        match EFFORT_VALUES.iter().find(|&&e| e as i64 == value) {
            Some(&e) => Ok(Effort(e)),
            None => Err(TodoError::validation(format!(
                "Effort must be a Fibonacci number from {:?}, got {}",
                EFFORT_VALUES, value
            ))),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Effort {
    fn default() -> Self {
        Effort(1)
    }
}

impl TryFrom<i64> for Effort {
    type Error = TodoError;

    fn try_from(value: i64) -> Result<Self> {
        Effort::new(value)
    }
}

impl From<Effort> for u8 {
    fn from(effort: Effort) -> u8 {
        effort.0
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate and trim a todo title
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(TodoError::validation("Title cannot be empty"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Empty descriptions are stored as NULL
pub(crate) fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Todo model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub urgency: Urgency,
    pub effort: Effort,
    pub completed: bool,
    pub parent_id: Option<i64>,
    pub tags: Vec<String>, // Normalized tag names, sorted
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Todo {
    /// Incomplete with a deadline strictly before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline.map_or(false, |d| d < today)
    }

    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Input for creating a todo
///
/// Urgency and effort are carried raw and validated by the repository so that
/// out-of-domain input surfaces as a validation error at the write boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub urgency: i64,
    pub effort: i64,
    pub tags: Vec<String>,
    pub parent_id: Option<i64>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            deadline: None,
            urgency: MIN_URGENCY as i64,
            effort: 1,
            tags: Vec::new(),
            parent_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn urgency(mut self, urgency: i64) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn effort(mut self, effort: i64) -> Self {
        self.effort = effort;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Partial update: `None` leaves a field unchanged.
/// For nullable fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<Option<NaiveDate>>,
    pub urgency: Option<i64>,
    pub effort: Option<i64>,
    pub completed: Option<bool>,
    pub parent_id: Option<Option<i64>>,
    /// Replaces the whole tag set when present
    pub tags: Option<Vec<String>>,
}

impl TodoUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TodoUpdate::default()
    }
}

/// One subtask to create under an existing parent.
/// Omitted urgency, effort and deadline are inherited from the parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtaskSpec {
    pub title: String,
    pub description: Option<String>,
    pub urgency: Option<i64>,
    pub effort: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl SubtaskSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A todo with its subtasks nested recursively
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoNode {
    #[serde(flatten)]
    pub todo: Todo,
    pub subtasks: Vec<TodoNode>,
}

impl TodoNode {
    /// Number of todos in this subtree, including the root
    pub fn len(&self) -> usize {
        1 + self.subtasks.iter().map(TodoNode::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_bounds() {
        for u in 1..=5 {
            assert_eq!(Urgency::new(u).unwrap().value() as i64, u);
        }
        assert!(matches!(Urgency::new(0), Err(TodoError::Validation(_))));
        assert!(matches!(Urgency::new(6), Err(TodoError::Validation(_))));
        assert!(Urgency::new(-3).is_err());
    }

    #[test]
    fn test_effort_fibonacci_only() {
        for e in EFFORT_VALUES {
            assert_eq!(Effort::new(e as i64).unwrap().value(), e);
        }
        for bad in [0, 4, 6, 7, 20, 34] {
            assert!(matches!(Effort::new(bad), Err(TodoError::Validation(_))), "effort {}", bad);
        }
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Buy milk ").unwrap(), "Buy milk");
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(Some("  ")), None);
        assert_eq!(normalize_description(Some(" text ")), Some("text".to_string()));
        assert_eq!(normalize_description(None), None);
    }

    #[test]
    fn test_is_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut todo = Todo {
            id: 1,
            title: "t".to_string(),
            description: None,
            deadline: Some(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()),
            urgency: Urgency::default(),
            effort: Effort::default(),
            completed: false,
            parent_id: None,
            tags: Vec::new(),
            created_ts: 0,
            modified_ts: 0,
        };
        assert!(todo.is_overdue(today));

        todo.deadline = Some(today);
        assert!(!todo.is_overdue(today));

        todo.deadline = Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        todo.completed = true;
        assert!(!todo.is_overdue(today));
    }

    #[test]
    fn test_urgency_serializes_as_number() {
        let json = serde_json::to_string(&Urgency::new(4).unwrap()).unwrap();
        assert_eq!(json, "4");
        let parsed: Effort = serde_json::from_str("13").unwrap();
        assert_eq!(parsed.value(), 13);
        assert!(serde_json::from_str::<Effort>("4").is_err());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(TodoUpdate::default().is_empty());
        let update = TodoUpdate {
            completed: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
