use rusqlite::{Connection, Result, Transaction};

type Migration = fn(&Transaction) -> Result<()>;

/// Schema migrations in order; the last entry is the current version
const MIGRATIONS: &[(u32, Migration)] = &[(1, migration_v1 as Migration)];

/// Versioned schema setup tracked in `schema_version`
pub struct MigrationManager;

impl MigrationManager {
    /// Bring the schema up to the current version. Safe to call on every open.
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        let current = Self::get_version(conn)?;
        for (version, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            let tx = conn.unchecked_transaction()?;
            migrate(&tx)?;
            tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
        }
        Ok(())
    }

    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))
    }
}

/// v1: one JSON document per storage key (e.g. appState_v1)
fn migration_v1(tx: &Transaction) -> Result<()> {
    tx.execute(
        "CREATE TABLE kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_ts INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}
