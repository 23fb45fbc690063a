use rusqlite::{Connection, OptionalExtension};
use anyhow::{Context, Result};

/// Key-value repository for persisted documents
pub struct KvRepo;

impl KvRepo {
    /// Get the value stored under `key` (if any)
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;

        stmt.query_row([key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read key '{}'", key))
    }

    /// Insert or replace the value under `key`
    pub fn put(conn: &Connection, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO kv_store (key, value, updated_ts) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_ts = excluded.updated_ts",
            rusqlite::params![key, value, now],
        )
        .with_context(|| format!("Failed to write key '{}'", key))?;

        Ok(())
    }

    /// Remove `key`. Returns true if a row was deleted.
    pub fn delete(conn: &Connection, key: &str) -> Result<bool> {
        let deleted = conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .with_context(|| format!("Failed to delete key '{}'", key))?;
        Ok(deleted > 0)
    }
}
