//! Splitting a todo into subtasks

use rusqlite::Connection;
use crate::error::{Result, TodoError};
use crate::models::{NewTodo, SubtaskSpec, Todo};
use crate::repo::TodoRepo;

/// Create subtasks under `parent_id`, returned in the order supplied
///
/// Urgency, effort and deadline left unset in a spec are taken from the
/// parent. The parent itself is not modified. All subtasks are written in a
/// single transaction, so one invalid spec means none are created.
pub fn create_subtasks(conn: &Connection, parent_id: i64, specs: &[SubtaskSpec]) -> Result<Vec<Todo>> {
    let tx = conn.unchecked_transaction()?;
    let parent = TodoRepo::get(&tx, parent_id)?;

    if specs.is_empty() {
        return Err(TodoError::validation("At least one subtask is required"));
    }

    let mut created = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let new = inherit(&parent, spec);
        let todo = TodoRepo::insert(&tx, &new).map_err(|err| match err {
            TodoError::Validation(message) => {
                TodoError::Validation(format!("Subtask {}: {}", index + 1, message))
            }
            other => other,
        })?;
        created.push(todo);
    }

    tx.commit()?;
    log::info!("Created {} subtask(s) under todo {}", created.len(), parent_id);
    Ok(created)
}

fn inherit(parent: &Todo, spec: &SubtaskSpec) -> NewTodo {
    NewTodo {
        title: spec.title.clone(),
        description: spec.description.clone(),
        deadline: spec.deadline.or(parent.deadline),
        urgency: spec.urgency.unwrap_or(parent.urgency.value() as i64),
        effort: spec.effort.unwrap_or(parent.effort.value() as i64),
        tags: spec.tags.clone(),
        parent_id: Some(parent.id),
    }
}
