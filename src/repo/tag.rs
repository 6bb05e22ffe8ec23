use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use crate::error::Result;
use crate::models::{normalize_tag_name, Tag, TagCount};

/// Tag repository for database operations
///
/// Tags are created implicitly the first time a todo references them and are
/// never removed automatically; a tag with no todos simply reports a count of 0.
pub struct TagRepo;

impl TagRepo {
    /// Get a tag by name, creating it if needed. The name is normalized first.
    pub fn get_or_create(conn: &Connection, name: &str) -> Result<Tag> {
        let name = normalize_tag_name(name)?;

        // INSERT OR IGNORE keeps this safe if another writer created the tag first
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
            [&name],
        )?;
        if inserted > 0 {
            log::debug!("Created tag '{}'", name);
        }

        let id: i64 = conn.query_row(
            "SELECT id FROM tags WHERE name = ?1",
            [&name],
            |row| row.get(0),
        )?;
        Ok(Tag { id, name })
    }

    /// Get tag by (normalized) name
    pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<Tag>> {
        let name = normalize_tag_name(name)?;
        let tag = conn
            .query_row(
                "SELECT id, name FROM tags WHERE name = ?1",
                [&name],
                |row| Ok(Tag { id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()?;
        Ok(tag)
    }

    /// List all tags by name
    pub fn list(conn: &Connection) -> Result<Vec<Tag>> {
        let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Tag { id: row.get(0)?, name: row.get(1)? })
        })?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    /// List every tag with the number of todos bearing it
    pub fn list_with_counts(conn: &Connection) -> Result<Vec<TagCount>> {
        let mut stmt = conn.prepare(
            "SELECT t.name, COUNT(tt.todo_id)
             FROM tags t LEFT JOIN todo_tags tt ON tt.tag_id = t.id
             GROUP BY t.id
             ORDER BY t.name"
        )?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok(TagCount { name: row.get(0)?, count: count as usize })
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// Replace a todo's tag set. Names must already be normalized.
    pub fn set_for_todo(conn: &Connection, todo_id: i64, names: &[String]) -> Result<()> {
        conn.execute("DELETE FROM todo_tags WHERE todo_id = ?1", [todo_id])?;
        for name in names {
            let tag = Self::get_or_create(conn, name)?;
            conn.execute(
                "INSERT INTO todo_tags (todo_id, tag_id) VALUES (?1, ?2)",
                rusqlite::params![todo_id, tag.id],
            )?;
        }
        Ok(())
    }

    /// Get tag names for a todo, sorted
    pub fn names_for_todo(conn: &Connection, todo_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT t.name FROM todo_tags tt JOIN tags t ON t.id = tt.tag_id
             WHERE tt.todo_id = ?1 ORDER BY t.name"
        )?;
        let rows = stmt.query_map([todo_id], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// Load tag names for every todo in one query (todo id -> sorted names)
    pub fn names_by_todo(conn: &Connection) -> Result<HashMap<i64, Vec<String>>> {
        let mut stmt = conn.prepare(
            "SELECT tt.todo_id, t.name FROM todo_tags tt JOIN tags t ON t.id = tt.tag_id
             ORDER BY tt.todo_id, t.name"
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            let (todo_id, name) = row?;
            map.entry(todo_id).or_default().push(name);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::error::TodoError;

    #[test]
    fn test_get_or_create_is_idempotent_and_normalizes() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let first = TagRepo::get_or_create(&conn, "Work").unwrap();
        let second = TagRepo::get_or_create(&conn, " work ").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "work");
        assert_eq!(TagRepo::list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_get_or_create_rejects_invalid_name() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let err = TagRepo::get_or_create(&conn, "two words").unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
    }

    #[test]
    fn test_get_by_name_missing() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert!(TagRepo::get_by_name(&conn, "nothing").unwrap().is_none());
    }

    #[test]
    fn test_orphan_tag_counts_zero() {
        let conn = DbConnection::connect_in_memory().unwrap();
        TagRepo::get_or_create(&conn, "lonely").unwrap();
        let counts = TagRepo::list_with_counts(&conn).unwrap();
        assert_eq!(counts, vec![TagCount { name: "lonely".to_string(), count: 0 }]);
    }
}
