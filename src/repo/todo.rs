use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use crate::error::{Result, TodoError};
use crate::models::{
    normalize_description, normalize_tag_name, normalize_tag_names, validate_title, Effort,
    NewTodo, Todo, TodoNode, TodoUpdate, Urgency,
};
use crate::priority;
use crate::repo::TagRepo;

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    deadline,
    urgency,
    effort,
    completed,
    parent_id,
    created_ts,
    modified_ts
FROM todos";

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Which level of the subtask hierarchy to list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentFilter {
    #[default]
    Any,
    /// Only todos without a parent
    TopLevel,
    /// Only direct children of the given todo
    ChildrenOf(i64),
}

/// Result ordering for list queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TodoOrder {
    /// Insertion order (id ascending)
    #[default]
    Storage,
    /// See [`crate::priority`]
    Priority,
}

/// Query options for listing todos
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub tag: Option<String>,
    pub parent: ParentFilter,
    pub order: TodoOrder,
}

/// Todo repository for database operations
///
/// Every write runs in its own transaction; on error the transaction is
/// dropped and rolled back, so a failed call leaves no persisted change.
///
/// # Subtasks
///
/// The hierarchy is stored as an explicit `parent_id` reference. Writes that
/// set a parent walk the new parent's ancestors and reject the change if the
/// todo itself shows up, so the graph stays a forest.
///
/// # Example
///
/// ```no_run
/// use deltatask::db::DbConnection;
/// use deltatask::models::NewTodo;
/// use deltatask::repo::TodoRepo;
///
/// let conn = DbConnection::connect().unwrap();
/// let todo = TodoRepo::add(&conn, &NewTodo::new("Write report").urgency(4).effort(5)).unwrap();
/// TodoRepo::delete(&conn, todo.id, true).unwrap();
/// ```
pub struct TodoRepo;

impl TodoRepo {
    /// Create a new todo
    pub fn add(conn: &Connection, new: &NewTodo) -> Result<Todo> {
        let tx = conn.unchecked_transaction()?;
        let todo = Self::insert(&tx, new)?;
        tx.commit()?;
        log::info!("Added todo {}: {}", todo.id, todo.title);
        Ok(todo)
    }

    /// Validate and insert without opening a transaction (callers own it)
    pub(crate) fn insert(conn: &Connection, new: &NewTodo) -> Result<Todo> {
        let title = validate_title(&new.title)?;
        let urgency = Urgency::new(new.urgency)?;
        let effort = Effort::new(new.effort)?;
        let tags = normalize_tag_names(&new.tags)?;
        let description = normalize_description(new.description.as_deref());

        if let Some(parent_id) = new.parent_id {
            if !Self::exists(conn, parent_id)? {
                return Err(TodoError::validation(format!(
                    "Parent todo {} does not exist",
                    parent_id
                )));
            }
        }

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO todos (title, description, deadline, urgency, effort, completed,
                                parent_id, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8)",
            rusqlite::params![
                title,
                description,
                new.deadline.map(format_deadline),
                urgency.value(),
                effort.value(),
                new.parent_id,
                now,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();

        TagRepo::set_for_todo(conn, id, &tags)?;

        Ok(Todo {
            id,
            title,
            description,
            deadline: new.deadline,
            urgency,
            effort,
            completed: false,
            parent_id: new.parent_id,
            tags,
            created_ts: now,
            modified_ts: now,
        })
    }

    /// Get todo by ID, failing with `NotFound` if absent
    pub fn get(conn: &Connection, id: i64) -> Result<Todo> {
        Self::find(conn, id)?.ok_or_else(|| TodoError::todo_not_found(id))
    }

    /// Get todo by ID
    pub fn find(conn: &Connection, id: i64) -> Result<Option<Todo>> {
        let sql = format!("{} WHERE id = ?1", TODO_SELECT_SQL);
        let todo = conn.query_row(&sql, [id], todo_from_row).optional()?;

        match todo {
            Some(mut todo) => {
                todo.tags = TagRepo::names_for_todo(conn, id)?;
                Ok(Some(todo))
            }
            None => Ok(None),
        }
    }

    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let found = conn
            .query_row("SELECT 1 FROM todos WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// List todos matching a filter
    pub fn list(conn: &Connection, filter: &TodoFilter) -> Result<Vec<Todo>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(completed) = filter.completed {
            conditions.push("completed = ?");
            params.push(Value::Integer(completed as i64));
        }

        if let Some(tag) = &filter.tag {
            conditions.push(
                "id IN (SELECT tt.todo_id FROM todo_tags tt JOIN tags t ON t.id = tt.tag_id
                        WHERE t.name = ?)",
            );
            params.push(Value::Text(normalize_tag_name(tag)?));
        }

        match filter.parent {
            ParentFilter::Any => {}
            ParentFilter::TopLevel => conditions.push("parent_id IS NULL"),
            ParentFilter::ChildrenOf(parent_id) => {
                conditions.push("parent_id = ?");
                params.push(Value::Integer(parent_id));
            }
        }

        let mut sql = TODO_SELECT_SQL.to_string();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY id");
        log::debug!("Listing todos: {:?}", filter);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), todo_from_row)?;

        let mut tag_map = TagRepo::names_by_todo(conn)?;
        let mut todos = Vec::new();
        for row in rows {
            let mut todo = row?;
            todo.tags = tag_map.remove(&todo.id).unwrap_or_default();
            todos.push(todo);
        }

        if filter.order == TodoOrder::Priority {
            priority::prioritize(&mut todos);
        }
        Ok(todos)
    }

    /// List every todo in storage order
    pub fn list_all(conn: &Connection) -> Result<Vec<Todo>> {
        Self::list(conn, &TodoFilter::default())
    }

    /// Apply a partial update and return the updated todo
    pub fn update(conn: &Connection, id: i64, update: &TodoUpdate) -> Result<Todo> {
        let tx = conn.unchecked_transaction()?;
        let mut todo = Self::get(&tx, id)?;

        if let Some(title) = &update.title {
            todo.title = validate_title(title)?;
        }
        if let Some(description) = &update.description {
            todo.description = normalize_description(description.as_deref());
        }
        if let Some(deadline) = update.deadline {
            todo.deadline = deadline;
        }
        if let Some(urgency) = update.urgency {
            todo.urgency = Urgency::new(urgency)?;
        }
        if let Some(effort) = update.effort {
            todo.effort = Effort::new(effort)?;
        }
        if let Some(completed) = update.completed {
            todo.completed = completed;
        }
        if let Some(parent_id) = update.parent_id {
            if let Some(parent_id) = parent_id {
                Self::check_parent(&tx, id, parent_id)?;
            }
            todo.parent_id = parent_id;
        }
        let tags = match &update.tags {
            Some(tags) => Some(normalize_tag_names(tags)?),
            None => None,
        };

        let now = chrono::Utc::now().timestamp();
        tx.execute(
            "UPDATE todos SET title = ?1, description = ?2, deadline = ?3, urgency = ?4,
                              effort = ?5, completed = ?6, parent_id = ?7, modified_ts = ?8
             WHERE id = ?9",
            rusqlite::params![
                todo.title,
                todo.description,
                todo.deadline.map(format_deadline),
                todo.urgency.value(),
                todo.effort.value(),
                todo.completed,
                todo.parent_id,
                now,
                id
            ],
        )?;

        if let Some(tags) = tags {
            TagRepo::set_for_todo(&tx, id, &tags)?;
            todo.tags = tags;
        }
        todo.modified_ts = now;

        tx.commit()?;
        log::info!("Updated todo {}", id);
        Ok(todo)
    }

    /// Mark a todo complete or incomplete
    pub fn set_completed(conn: &Connection, id: i64, completed: bool) -> Result<Todo> {
        let update = TodoUpdate {
            completed: Some(completed),
            ..Default::default()
        };
        Self::update(conn, id, &update)
    }

    /// Delete a todo
    ///
    /// With `cascade` the whole subtree goes; otherwise the direct children are
    /// moved to top level and keep their own subtasks. Returns the number of
    /// todos removed.
    pub fn delete(conn: &Connection, id: i64, cascade: bool) -> Result<usize> {
        let tx = conn.unchecked_transaction()?;
        if !Self::exists(&tx, id)? {
            return Err(TodoError::todo_not_found(id));
        }

        let removed = if cascade {
            // One statement, so the parent_id foreign key is checked once all rows are gone
            tx.execute(
                "WITH RECURSIVE subtree(id) AS (
                     SELECT ?1
                     UNION
                     SELECT t.id FROM todos t JOIN subtree s ON t.parent_id = s.id
                 )
                 DELETE FROM todos WHERE id IN (SELECT id FROM subtree)",
                [id],
            )?
        } else {
            let now = chrono::Utc::now().timestamp();
            let orphaned = tx.execute(
                "UPDATE todos SET parent_id = NULL, modified_ts = ?2 WHERE parent_id = ?1",
                rusqlite::params![id, now],
            )?;
            if orphaned > 0 {
                log::debug!("Moved {} subtask(s) of todo {} to top level", orphaned, id);
            }
            tx.execute("DELETE FROM todos WHERE id = ?1", [id])?
        };

        tx.commit()?;
        log::info!("Deleted todo {} ({} row(s), cascade={})", id, removed, cascade);
        Ok(removed)
    }

    /// Get a todo with all of its subtasks nested; each level in priority order
    pub fn get_tree(conn: &Connection, id: i64) -> Result<TodoNode> {
        let root = Self::get(conn, id)?;

        let mut children: HashMap<i64, Vec<Todo>> = HashMap::new();
        for todo in Self::list_all(conn)? {
            if let Some(parent_id) = todo.parent_id {
                children.entry(parent_id).or_default().push(todo);
            }
        }

        let mut visited = HashSet::new();
        Ok(build_node(root, &mut children, &mut visited))
    }

    /// Ensure `parent_id` exists and is not `todo_id` or one of its descendants
    fn check_parent(conn: &Connection, todo_id: i64, parent_id: i64) -> Result<()> {
        if parent_id == todo_id {
            return Err(TodoError::validation(format!(
                "Todo {} cannot be its own parent",
                todo_id
            )));
        }
        if !Self::exists(conn, parent_id)? {
            return Err(TodoError::validation(format!(
                "Parent todo {} does not exist",
                parent_id
            )));
        }

        // Walk up from the new parent; meeting todo_id means it would become its own ancestor
        let mut seen = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(ancestor) = current {
            if ancestor == todo_id {
                log::warn!("Rejected parent {} for todo {}: cycle", parent_id, todo_id);
                return Err(TodoError::validation(format!(
                    "Cannot move todo {} under {}: {} is one of its subtasks",
                    todo_id, parent_id, parent_id
                )));
            }
            if !seen.insert(ancestor) {
                break;
            }
            current = conn
                .query_row(
                    "SELECT parent_id FROM todos WHERE id = ?1",
                    [ancestor],
                    |row| row.get::<_, Option<i64>>(0),
                )
                .optional()?
                .flatten();
        }
        Ok(())
    }
}

fn build_node(
    todo: Todo,
    children: &mut HashMap<i64, Vec<Todo>>,
    visited: &mut HashSet<i64>,
) -> TodoNode {
    visited.insert(todo.id);
    let mut kids = children.remove(&todo.id).unwrap_or_default();
    priority::prioritize(&mut kids);

    let mut subtasks = Vec::with_capacity(kids.len());
    for child in kids {
        if !visited.contains(&child.id) {
            subtasks.push(build_node(child, children, visited));
        }
    }

    TodoNode { todo, subtasks }
}

fn format_deadline(date: NaiveDate) -> String {
    date.format(DEADLINE_FORMAT).to_string()
}

/// Map a `todos` row (in TODO_SELECT_SQL column order) to a Todo without tags
fn todo_from_row(row: &Row) -> rusqlite::Result<Todo> {
    let deadline = match row.get::<_, Option<String>>(3)? {
        Some(text) => Some(
            NaiveDate::parse_from_str(&text, DEADLINE_FORMAT)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        ),
        None => None,
    };
    let urgency = Urgency::new(row.get(4)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e)))?;
    let effort = Effort::new(row.get(5)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Integer, Box::new(e)))?;

    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        deadline,
        urgency,
        effort,
        completed: row.get::<_, i64>(6)? != 0,
        parent_id: row.get(7)?,
        tags: Vec::new(),
        created_ts: row.get(8)?,
        modified_ts: row.get(9)?,
    })
}
