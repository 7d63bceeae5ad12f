use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::entry::EmotionEntry;

pub mod file;
pub mod postgres;

pub use file::FileEntryStore;
pub use postgres::PgEntryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable. Never conflated with "no entries" so callers
    /// can degrade instead of reporting a false zero-risk result.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence contract for emotion entries. Entries are append-only:
/// there is no update or delete.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Durably adds one entry. Previously stored entries must survive a
    /// failed append.
    async fn append(&self, entry: &EmotionEntry) -> Result<(), StoreError>;

    /// All entries for the user with `date >= since`; `None` means
    /// everything. Ordering is not guaranteed here — callers impose their
    /// own.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        since: Option<NaiveDate>,
    ) -> Result<Vec<EmotionEntry>, StoreError>;

    /// Cheap availability probe for readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
