use std::path::{Path, PathBuf};

use super::{StorageBackend, StorageError};

const DB_FILE_NAME: &str = "media-browser-card.db";

/// Key/value table used when the card runs outside the browser.
pub struct SqliteStorage {
    conn: rusqlite::Connection,
}

impl SqliteStorage {
    /// Opens the database in the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let data_dir = data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::open(&data_dir.join(DB_FILE_NAME))
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| StorageError::backend(format!("Failed to open database: {}", e)))?;
        Self::initialize(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StorageError::backend(e.to_string()))?;
        Self::initialize(conn)
    }

    fn initialize(conn: rusqlite::Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StorageError::backend(e.to_string()))?;

        Ok(Self { conn })
    }
}

impl StorageBackend for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let result: Result<String, rusqlite::Error> = self.conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [key],
            |row: &rusqlite::Row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::backend(e.to_string())),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                [key, value],
            )
            .map_err(|e| StorageError::backend(e.to_string()))?;
        Ok(())
    }
}

fn data_dir() -> Option<PathBuf> {
    let data_dir = dirs::data_dir()?.join("media-browser-card");
    std::fs::create_dir_all(&data_dir).ok()?;
    Some(data_dir)
}
