use crate::{Error, Result};
use rusqlite::Connection as SqliteConnection;
use std::path::{Path, PathBuf};
use tracing::debug;

pub type Connection = SqliteConnection;

/// The SQLite file holding the client's saved login
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open the file, creating it and its parent directory if needed.
    ///
    /// The schema only creates what is missing, so it is applied on every open.
    pub fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = SqliteConnection::open(&self.db_path)?;
        apply_schema(&conn)?;
        debug!(
            "Opened local state at {} (schema v{})",
            self.db_path.display(),
            Self::schema_version(&conn)?
        );
        Ok(conn)
    }

    /// A private in-memory database, used by tests
    pub fn in_memory() -> Result<Connection> {
        let conn = SqliteConnection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(conn)
    }

    pub fn schema_version(conn: &Connection) -> Result<i32> {
        let version: String = conn.query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;

        version
            .parse::<i32>()
            .map_err(|_| Error::InvalidInput(format!("Invalid schema version '{}'", version)))
    }
}

fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("../../schema.sql"))?;
    Ok(())
}
