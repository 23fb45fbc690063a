// Storage backends for the persisted state document

use crate::db::DbConnection;
use crate::repo::KvRepo;
use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Durable key-value storage for serialized state
pub trait Storage: Send {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// SQLite-backed storage
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self { conn: DbConnection::connect(db_path)? })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self { conn: DbConnection::connect_in_memory()? })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Storage for SqliteStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        KvRepo::get(&self.conn, key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        KvRepo::put(&self.conn, key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        KvRepo::delete(&self.conn, key)?;
        Ok(())
    }
}

/// In-memory storage. Clones share the same documents, so a test can keep a
/// handle and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    docs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner()).remove(key);
        Ok(())
    }
}
