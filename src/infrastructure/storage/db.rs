use crate::domain::error::TranslateError;
use crate::domain::model::{HistoryEntry, ProviderCredentials};
use crate::domain::traits::CredentialStore;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use tokio_rusqlite::Connection;

pub async fn init_database(db: &Connection) -> Result<(), TranslateError> {
    db.call(|conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL,
                task TEXT NOT NULL,
                source_lang TEXT NOT NULL,
                target_lang TEXT NOT NULL,
                original_text TEXT NOT NULL,
                result_text TEXT NOT NULL,
                elapsed_seconds REAL NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_created ON history(created_at)",
            [],
        )?;

        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    Ok(())
}

fn credentials_key(provider_id: &str) -> String {
    format!("{}.credentials", provider_id.trim().to_ascii_lowercase())
}

/// Durable key-value settings plus translation history, in one SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub async fn open(db_path: &Path) -> Result<Self, TranslateError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path.to_path_buf()).await?;
        init_database(&conn).await?;
        Ok(Self { conn })
    }

    pub async fn open_in_memory() -> Result<Self, TranslateError> {
        let conn = Connection::open_in_memory().await?;
        init_database(&conn).await?;
        Ok(Self { conn })
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, TranslateError> {
        let key = key.to_string();
        let value = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT value FROM settings WHERE key = ?",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await?;
        Ok(value)
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), TranslateError> {
        let key = key.to_string();
        let value = value.to_string();
        let now = chrono::Utc::now().timestamp();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, ?)",
                    params![key, value, now],
                )
            })
            .await?;
        Ok(())
    }

    pub async fn remove_setting(&self, key: &str) -> Result<bool, TranslateError> {
        let key = key.to_string();
        let removed = self
            .conn
            .call(move |conn| conn.execute("DELETE FROM settings WHERE key = ?", params![key]))
            .await?;
        Ok(removed > 0)
    }

    pub async fn record_history(&self, entry: &HistoryEntry) -> Result<(), TranslateError> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO history (id, provider_id, task, source_lang, target_lang,
                        original_text, result_text, elapsed_seconds, created_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        entry.id,
                        entry.provider_id,
                        entry.task,
                        entry.source_lang,
                        entry.target_lang,
                        entry.original_text,
                        entry.result_text,
                        entry.elapsed_seconds,
                        entry.created_at
                    ],
                )
            })
            .await?;
        Ok(())
    }

    /// Newest first.
    pub async fn recent_history(&self, limit: usize) -> Result<Vec<HistoryEntry>, TranslateError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, provider_id, task, source_lang, target_lang, original_text,
                            result_text, elapsed_seconds, created_at
                     FROM history ORDER BY created_at DESC, rowid DESC LIMIT ?",
                )?;
                let rows = stmt.query_map(params![limit], |row| {
                    Ok(HistoryEntry {
                        id: row.get(0)?,
                        provider_id: row.get(1)?,
                        task: row.get(2)?,
                        source_lang: row.get(3)?,
                        target_lang: row.get(4)?,
                        original_text: row.get(5)?,
                        result_text: row.get(6)?,
                        elapsed_seconds: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, rusqlite::Error>>()
            })
            .await?;
        Ok(entries)
    }

    pub async fn clear_history(&self) -> Result<usize, TranslateError> {
        let removed = self
            .conn
            .call(|conn| conn.execute("DELETE FROM history", []))
            .await?;
        Ok(removed)
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn load(&self, provider_id: &str) -> Result<Option<ProviderCredentials>, TranslateError> {
        match self.get_setting(&credentials_key(provider_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        provider_id: &str,
        credentials: &ProviderCredentials,
    ) -> Result<(), TranslateError> {
        let raw = serde_json::to_string(credentials)?;
        self.set_setting(&credentials_key(provider_id), &raw).await
    }
}
