// Plain-text rendering for CLI output

use chrono::{Local, NaiveDate, TimeZone};
use std::io::IsTerminal;
use crate::models::{TagCount, Todo, TodoNode};
use crate::query::Stats;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format a Unix timestamp in local time
pub fn format_timestamp(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Deadline with a short relative hint, e.g. "2026-01-10 (overdue)"
pub fn format_deadline(deadline: NaiveDate, today: NaiveDate) -> String {
    let days = (deadline - today).num_days();
    let hint = match days {
        d if d < 0 => "overdue".to_string(),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d <= 30 => format!("in {} days", d),
        _ => return deadline.format("%Y-%m-%d").to_string(),
    };
    format!("{} ({})", deadline.format("%Y-%m-%d"), hint)
}

fn format_tags(tags: &[String]) -> String {
    tags.iter().map(|t| format!("+{}", t)).collect::<Vec<_>>().join(" ")
}

/// Format todos as a table (one row per todo, in the given order)
pub fn format_todo_table(todos: &[Todo], today: NaiveDate) -> String {
    if todos.is_empty() {
        return "No todos found.".to_string();
    }

    let headers = ["ID", "Done", "Title", "Due", "Urg", "Eff", "Parent", "Tags"];
    let rows: Vec<[String; 8]> = todos
        .iter()
        .map(|todo| {
            [
                todo.id.to_string(),
                if todo.completed { "✓".to_string() } else { String::new() },
                todo.title.clone(),
                todo.deadline.map(|d| format_deadline(d, today)).unwrap_or_default(),
                todo.urgency.to_string(),
                todo.effort.to_string(),
                todo.parent_id.map(|p| p.to_string()).unwrap_or_default(),
                format_tags(&todo.tags),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let tty = is_tty();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut output = bold_if_tty(&render(&header_cells), tty);
    output.push('\n');
    output.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in &rows {
        output.push('\n');
        output.push_str(&render(row));
    }
    output
}

/// One-line summary used by add/modify/split confirmations
pub fn format_todo_line(todo: &Todo) -> String {
    let mut line = format!("{}: {}", todo.id, todo.title);
    if !todo.tags.is_empty() {
        line.push(' ');
        line.push_str(&format_tags(&todo.tags));
    }
    line
}

/// Detailed view of a todo followed by its subtask tree
pub fn format_todo_summary(node: &TodoNode, today: NaiveDate) -> String {
    let todo = &node.todo;
    let mut output = String::new();

    let header = format!("Todo {}: {}", todo.id, todo.title);
    output.push_str(&bold_if_tty(&header, is_tty()));
    output.push('\n');
    output.push_str(&"=".repeat(header.chars().count().max(40)));
    output.push_str("\n\n");

    if let Some(description) = &todo.description {
        output.push_str("Description:\n");
        output.push_str(&format!("  {}\n\n", description));
    }

    output.push_str(&format!("Status:     {}\n", if todo.completed { "completed" } else { "open" }));
    match todo.deadline {
        Some(deadline) => output.push_str(&format!("Due:        {}\n", format_deadline(deadline, today))),
        None => output.push_str("Due:        (none)\n"),
    }
    output.push_str(&format!("Urgency:    {}\n", todo.urgency));
    output.push_str(&format!("Effort:     {}\n", todo.effort));
    match todo.parent_id {
        Some(parent_id) => output.push_str(&format!("Parent:     {}\n", parent_id)),
        None => output.push_str("Parent:     (top level)\n"),
    }
    if todo.tags.is_empty() {
        output.push_str("Tags:       (none)\n");
    } else {
        output.push_str(&format!("Tags:       {}\n", format_tags(&todo.tags)));
    }
    output.push_str(&format!("Created:    {}\n", format_timestamp(todo.created_ts)));
    output.push_str(&format!("Modified:   {}\n", format_timestamp(todo.modified_ts)));

    if !node.subtasks.is_empty() {
        output.push_str(&format!("\nSubtasks ({}):\n", node.len() - 1));
        for child in &node.subtasks {
            push_tree_lines(&mut output, child, 1);
        }
    }

    output.trim_end().to_string()
}

fn push_tree_lines(output: &mut String, node: &TodoNode, depth: usize) {
    let marker = if node.todo.completed { "[x]" } else { "[ ]" };
    output.push_str(&format!(
        "{}{} {}: {}\n",
        "  ".repeat(depth),
        marker,
        node.todo.id,
        node.todo.title
    ));
    for child in &node.subtasks {
        push_tree_lines(output, child, depth + 1);
    }
}

/// Format statistics as labelled lines
pub fn format_stats(stats: &Stats) -> String {
    let mut output = String::new();
    output.push_str(&format!("Total:              {}\n", stats.total));
    output.push_str(&format!("Completed:          {}\n", stats.completed));
    output.push_str(&format!("Incomplete:         {}\n", stats.incomplete));
    output.push_str(&format!("Overdue:            {}\n", stats.overdue));
    output.push_str(&format!("Due within 7 days:  {}\n", stats.upcoming_deadlines));
    output.push_str(&format!("Completion rate:    {:.1}%\n", stats.completion_rate));

    output.push_str("\nOpen by urgency:\n");
    for (urgency, count) in stats.by_urgency.iter().rev() {
        output.push_str(&format!("  {}: {}\n", urgency, count));
    }

    if !stats.by_tag.is_empty() {
        output.push_str("\nBy tag:\n");
        for (name, count) in &stats.by_tag {
            output.push_str(&format!("  {}: {}\n", name, count));
        }
    }

    output.trim_end().to_string()
}

/// Format tag list with usage counts
pub fn format_tag_counts(tags: &[TagCount]) -> String {
    if tags.is_empty() {
        return "No tags found.".to_string();
    }
    let width = tags.iter().map(|t| t.name.chars().count()).max().unwrap_or(0);
    tags.iter()
        .map(|t| format!("{:<width$}  {}", t.name, t.count, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Effort, Urgency};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            description: None,
            deadline: None,
            urgency: Urgency::new(3).unwrap(),
            effort: Effort::new(5).unwrap(),
            completed: false,
            parent_id: None,
            tags: vec!["work".to_string()],
            created_ts: 0,
            modified_ts: 0,
        }
    }

    #[test]
    fn test_format_deadline_hints() {
        let today = day(2026, 1, 10);
        assert_eq!(format_deadline(day(2026, 1, 9), today), "2026-01-09 (overdue)");
        assert_eq!(format_deadline(today, today), "2026-01-10 (today)");
        assert_eq!(format_deadline(day(2026, 1, 11), today), "2026-01-11 (tomorrow)");
        assert_eq!(format_deadline(day(2026, 1, 15), today), "2026-01-15 (in 5 days)");
        assert_eq!(format_deadline(day(2026, 6, 1), today), "2026-06-01");
    }

    #[test]
    fn test_format_todo_table() {
        let table = format_todo_table(&[todo(1, "Write report"), todo(12, "Ship")], day(2026, 1, 1));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("ID") && lines[0].contains("Title"));
        assert!(lines[2].starts_with("1 "));
        assert!(lines[2].contains("Write report"));
        assert!(lines[3].contains("+work"));
    }

    #[test]
    fn test_format_empty_table() {
        assert_eq!(format_todo_table(&[], day(2026, 1, 1)), "No todos found.");
    }

    #[test]
    fn test_format_summary_lists_subtasks() {
        let mut child = todo(2, "Child");
        child.parent_id = Some(1);
        let node = TodoNode {
            todo: todo(1, "Parent"),
            subtasks: vec![TodoNode { todo: child, subtasks: Vec::new() }],
        };
        let summary = format_todo_summary(&node, day(2026, 1, 1));
        assert!(summary.contains("Todo 1: Parent"));
        assert!(summary.contains("Subtasks (1):"));
        assert!(summary.contains("[ ] 2: Child"));
    }

    #[test]
    fn test_format_tag_counts() {
        let tags = vec![
            TagCount { name: "home".to_string(), count: 0 },
            TagCount { name: "urgent".to_string(), count: 3 },
        ];
        assert_eq!(format_tag_counts(&tags), "home    0\nurgent  3");
        assert_eq!(format_tag_counts(&[]), "No tags found.");
    }
}
