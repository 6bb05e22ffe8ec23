use rusqlite::Connection;
use std::path::Path;
use anyhow::{Context, Result};
use crate::config::Config;
use crate::db::migrations::MigrationManager;

/// Database connection manager
pub struct DbConnection;

impl DbConnection {
    /// Connect to the configured database, creating it and parent directories if needed
    pub fn connect() -> Result<Connection> {
        let config = Config::load()?;
        Self::connect_at(&config.data_location)
    }

    /// Connect to a database file at an explicit path
    pub fn connect_at(db_path: &Path) -> Result<Connection> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        log::debug!("Opened database {}", db_path.display());

        Self::prepare(&conn)?;
        Ok(conn)
    }

    /// Connect to an in-memory database (for testing)
    pub fn connect_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory()
            .context("Failed to open in-memory database")?;
        Self::prepare(&conn)?;
        Ok(conn)
    }

    /// Enable foreign keys (per connection in SQLite) and bring the schema up to date
    fn prepare(conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys=ON", [])
            .context("Failed to enable foreign keys")?;
        MigrationManager::initialize(conn)
            .context("Failed to initialize database schema")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_connect_at_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let conn = DbConnection::connect_at(&db_path).unwrap();
        assert!(db_path.exists());

        let version = MigrationManager::get_version(&conn).unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn test_connect_in_memory_enables_foreign_keys() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
