use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{EntryStore, StoreError};
use crate::models::entry::EmotionEntry;

/// Postgres-backed, multi-tenant store. Rows are append-only; the only
/// write is `INSERT`.
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn append(&self, entry: &EmotionEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO emotion_entries (id, user_id, entry_date, message, emoji, emotion, summary, emotion_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.date)
        .bind(&entry.message)
        .bind(&entry.emoji)
        .bind(&entry.emotion)
        .bind(&entry.summary)
        .bind(entry.emotion_score)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        since: Option<NaiveDate>,
    ) -> Result<Vec<EmotionEntry>, StoreError> {
        let entries = if let Some(since) = since {
            sqlx::query_as::<_, EmotionEntry>(
                r#"
                SELECT * FROM emotion_entries
                WHERE user_id = $1 AND entry_date >= $2
                ORDER BY entry_date DESC
                "#,
            )
            .bind(user_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, EmotionEntry>(
                r#"
                SELECT * FROM emotion_entries
                WHERE user_id = $1
                ORDER BY entry_date DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(entries)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
