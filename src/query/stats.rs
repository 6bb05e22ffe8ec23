// Aggregate counts over the todo store

use chrono::{Duration, Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use crate::error::Result;
use crate::models::{TagCount, Todo, MAX_URGENCY, MIN_URGENCY};
use crate::repo::{TagRepo, TodoRepo};

/// Window for `upcoming_deadlines`, in days from today (inclusive)
pub const UPCOMING_DAYS: i64 = 7;

/// Store-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
    /// Incomplete todos whose deadline is before today
    pub overdue: usize,
    /// Incomplete todos with a deadline from today through today + 7 days
    pub upcoming_deadlines: usize,
    /// Percentage of todos completed; 0 when there are none
    pub completion_rate: f64,
    /// Incomplete todos per urgency level; every level 1..=5 is present
    pub by_urgency: BTreeMap<u8, usize>,
    /// Todos per tag name, including tags no todo uses any more
    pub by_tag: BTreeMap<String, usize>,
}

/// Statistics as of the local date
pub fn statistics(conn: &Connection) -> Result<Stats> {
    statistics_at(conn, Local::now().date_naive())
}

/// Statistics with an explicit reference date
pub fn statistics_at(conn: &Connection, today: NaiveDate) -> Result<Stats> {
    let todos = TodoRepo::list_all(conn)?;
    let tags = TagRepo::list_with_counts(conn)?;
    Ok(compute(&todos, &tags, today))
}

pub fn compute(todos: &[Todo], tags: &[TagCount], today: NaiveDate) -> Stats {
    let horizon = today + Duration::days(UPCOMING_DAYS);

    let mut by_urgency: BTreeMap<u8, usize> = (MIN_URGENCY..=MAX_URGENCY).map(|u| (u, 0)).collect();
    let mut completed = 0;
    let mut overdue = 0;
    let mut upcoming = 0;

    for todo in todos {
        if todo.completed {
            completed += 1;
            continue;
        }
        *by_urgency.entry(todo.urgency.value()).or_insert(0) += 1;
        if todo.is_overdue(today) {
            overdue += 1;
        } else if todo.deadline.map_or(false, |d| d <= horizon) {
            upcoming += 1;
        }
    }

    let total = todos.len();
    let completion_rate = if total > 0 {
        completed as f64 * 100.0 / total as f64
    } else {
        0.0
    };

    Stats {
        total,
        completed,
        incomplete: total - completed,
        overdue,
        upcoming_deadlines: upcoming,
        completion_rate,
        by_urgency,
        by_tag: tags.iter().map(|t| (t.name.clone(), t.count)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Effort, Urgency};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn todo(id: i64, urgency: i64, deadline: Option<NaiveDate>, completed: bool) -> Todo {
        Todo {
            id,
            title: format!("Todo {}", id),
            description: None,
            deadline,
            urgency: Urgency::new(urgency).unwrap(),
            effort: Effort::default(),
            completed,
            parent_id: None,
            tags: Vec::new(),
            created_ts: 0,
            modified_ts: 0,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let stats = compute(&[], &[], day(10));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.incomplete, 0);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.upcoming_deadlines, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.by_urgency.len(), 5);
        assert!(stats.by_urgency.values().all(|&c| c == 0));
        assert!(stats.by_tag.is_empty());
    }

    #[test]
    fn test_counts() {
        let todos = vec![
            todo(1, 5, Some(day(9)), false),  // overdue
            todo(2, 5, Some(day(10)), false), // due today: upcoming, not overdue
            todo(3, 2, Some(day(17)), false), // edge of window
            todo(4, 2, Some(day(18)), false), // beyond window
            todo(5, 1, Some(day(1)), true),   // completed, never overdue
        ];
        let tags = vec![TagCount { name: "work".to_string(), count: 2 }];
        let stats = compute(&todos, &tags, day(10));

        assert_eq!(stats.total, 5);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.incomplete, 4);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.upcoming_deadlines, 2);
        assert_eq!(stats.completion_rate, 20.0);
        assert_eq!(stats.by_urgency[&5], 2);
        assert_eq!(stats.by_urgency[&2], 2);
        assert_eq!(stats.by_urgency[&1], 0);
        assert_eq!(stats.by_tag["work"], 2);
    }
}
