use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::fs;
use uuid::Uuid;

use super::{EntryStore, StoreError};
use crate::models::entry::EmotionEntry;

/// Flat-file backend: one pretty-printed JSON array, rewritten in full on
/// every append. Single-tenant — the caller's user id is ignored and no
/// owner field is written to disk. Suited to small per-user datasets only.
pub struct FileEntryStore {
    path: PathBuf,
}

impl FileEntryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Raw record array as stored. Missing file reads as empty; a file
    /// that is not a JSON array also reads as empty (warned, not fatal).
    async fn load_raw(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "history file is not a JSON array, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    // Rewrite through a temp file + rename so a failed write never
    // clobbers the existing history.
    async fn write_all(&self, records: &[serde_json::Value]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl EntryStore for FileEntryStore {
    async fn append(&self, entry: &EmotionEntry) -> Result<(), StoreError> {
        let mut records = self.load_raw().await?;
        records.push(serde_json::to_value(entry)?);
        self.write_all(&records).await
    }

    async fn list_for_user(
        &self,
        _user_id: Uuid,
        since: Option<NaiveDate>,
    ) -> Result<Vec<EmotionEntry>, StoreError> {
        let records = self.load_raw().await?;
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            match serde_json::from_value::<EmotionEntry>(record) {
                Ok(entry) => {
                    if since.map_or(true, |s| entry.date >= s) {
                        entries.push(entry);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "skipping unparseable history record"
                    );
                }
            }
        }

        Ok(entries)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::metadata(dir)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", dir.display(), e)))?;
        Ok(())
    }
}
