//! Deterministic todo ordering
//!
//! Keys, in order of precedence:
//! 1. incomplete before completed
//! 2. todos with a deadline before todos without; earlier deadline first
//! 3. urgency, highest first
//! 4. effort, smallest first (quick wins)
//! 5. id, ascending
//!
//! Ids are unique, so the comparison is a total order and sorting is
//! reproducible for unchanged input.

use crate::models::Todo;
use std::cmp::Ordering;

/// Compare two todos by priority; `Less` means `a` should be worked on first
pub fn compare(a: &Todo, b: &Todo) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| compare_deadlines(a, b))
        .then_with(|| b.urgency.cmp(&a.urgency))
        .then_with(|| a.effort.cmp(&b.effort))
        .then_with(|| a.id.cmp(&b.id))
}

fn compare_deadlines(a: &Todo, b: &Todo) -> Ordering {
    match (a.deadline, b.deadline) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort todos in place by priority
pub fn prioritize(todos: &mut [Todo]) {
    todos.sort_by(compare);
}

/// Return todos sorted by priority
pub fn sorted(mut todos: Vec<Todo>) -> Vec<Todo> {
    prioritize(&mut todos);
    todos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Effort, Urgency};
    use chrono::NaiveDate;

    fn todo(id: i64, deadline: Option<(i32, u32, u32)>, urgency: i64, effort: i64, completed: bool) -> Todo {
        Todo {
            id,
            title: format!("Todo {}", id),
            description: None,
            deadline: deadline.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            urgency: Urgency::new(urgency).unwrap(),
            effort: Effort::new(effort).unwrap(),
            completed,
            parent_id: None,
            tags: Vec::new(),
            created_ts: 0,
            modified_ts: 0,
        }
    }

    fn ids(todos: &[Todo]) -> Vec<i64> {
        todos.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_deadline_beats_urgency() {
        // A: due tomorrow, urgency 3; B: no deadline, urgency 5; C: due today, urgency 1
        let a = todo(1, Some((2026, 5, 2)), 3, 1, false);
        let b = todo(2, None, 5, 1, false);
        let c = todo(3, Some((2026, 5, 1)), 1, 1, false);
        let ordered = sorted(vec![a, b, c]);
        assert_eq!(ids(&ordered), vec![3, 1, 2]);
    }

    #[test]
    fn test_completed_sort_last() {
        let done = todo(1, Some((2020, 1, 1)), 5, 1, true);
        let open = todo(2, None, 1, 21, false);
        let ordered = sorted(vec![done, open]);
        assert_eq!(ids(&ordered), vec![2, 1]);
    }

    #[test]
    fn test_urgency_then_effort_then_id() {
        let low_urgency = todo(1, None, 2, 1, false);
        let big = todo(2, None, 4, 8, false);
        let small = todo(3, None, 4, 2, false);
        let small_later_id = todo(4, None, 4, 2, false);
        let ordered = sorted(vec![small_later_id, low_urgency, big, small]);
        assert_eq!(ids(&ordered), vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_equal_deadlines_fall_through_to_urgency() {
        let a = todo(1, Some((2026, 1, 1)), 2, 1, false);
        let b = todo(2, Some((2026, 1, 1)), 5, 1, false);
        assert_eq!(compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_total_order_only_equal_for_same_id() {
        let a = todo(1, None, 3, 3, false);
        let b = todo(2, None, 3, 3, false);
        assert_ne!(compare(&a, &b), Ordering::Equal);
        assert_eq!(compare(&a, &a), Ordering::Equal);
        assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn test_sort_is_reproducible() {
        let input = vec![
            todo(5, None, 1, 1, true),
            todo(2, Some((2026, 2, 1)), 1, 3, false),
            todo(9, None, 5, 1, false),
            todo(1, Some((2026, 2, 1)), 1, 3, false),
        ];
        let first = sorted(input.clone());
        let mut reversed = input;
        reversed.reverse();
        let second = sorted(reversed);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec![1, 2, 9, 5]);
    }
}
