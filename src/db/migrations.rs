use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all pending migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn)?;

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::info!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: todos, tags and the todo/tag association
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE todos (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NULL,
            deadline TEXT NULL,
            urgency INTEGER NOT NULL CHECK(urgency BETWEEN 1 AND 5),
            effort INTEGER NOT NULL CHECK(effort IN (1,2,3,5,8,13,21)),
            completed INTEGER NOT NULL DEFAULT 0 CHECK(completed IN (0,1)),
            parent_id INTEGER NULL REFERENCES todos(id),
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    // Note: deadline is an ISO date (YYYY-MM-DD) so text order equals date order.
    // parent_id has no ON DELETE action; the repository decides between cascade and re-parent.

    tx.execute(
        "CREATE TABLE tags (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE todo_tags (
            todo_id INTEGER NOT NULL REFERENCES todos(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id),
            PRIMARY KEY(todo_id, tag_id)
        )",
        [],
    )?;

    Ok(())
}

/// Migration v2: lookup indexes for subtask listing, tag filtering and deadline scans
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE INDEX idx_todos_parent_id ON todos(parent_id)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_todos_deadline ON todos(deadline)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_todo_tags_tag ON todo_tags(tag_id)",
        [],
    )?;
    Ok(())
}
