use crate::db::migrations::MigrationManager;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// How long a writer waits on another process holding the database
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Opens state databases with the schema in place
pub struct DbConnection;

impl DbConnection {
    /// Open (or create) the database file at `db_path`, including missing parent directories
    pub fn connect(db_path: &Path) -> Result<Connection> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        // A shell and one-shot commands may share the file
        conn.busy_timeout(BUSY_TIMEOUT).context("Failed to set busy timeout")?;
        Self::prepare(conn)
    }

    pub fn connect_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Connection> {
        MigrationManager::initialize(&conn).context("Failed to initialize database schema")?;
        log::debug!("Database schema at v{}", MigrationManager::get_version(&conn)?);
        Ok(conn)
    }
}
