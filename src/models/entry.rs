use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One journaled message + emoji + classification, owned by a user on a
/// given date. Immutable once stored; the only write path is append.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmotionEntry {
    #[sqlx(rename = "entry_date")]
    pub date: NaiveDate,
    pub message: String,
    pub emoji: String,
    #[serde(default = "sentinel_na")]
    pub emotion: String,
    #[serde(default = "sentinel_na")]
    pub summary: String,
    #[serde(rename = "emotionScore")]
    pub emotion_score: i32,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

// Older stored records can lack emotion/summary; reads patch them instead
// of dropping the record.
fn sentinel_na() -> String {
    "N/A".to_string()
}

fn neutral_score() -> i32 {
    50
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub emoji: String,
}

/// Direct-save payload: classification fields come from a prior `/analyze`
/// response and are persisted as-is. Any client-sent `date` is ignored; the
/// server re-stamps it.
#[derive(Debug, Deserialize)]
pub struct SaveEntryRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default = "sentinel_na")]
    pub emotion: String,
    #[serde(default = "sentinel_na")]
    pub summary: String,
    #[serde(rename = "emotionScore", default = "neutral_score")]
    pub emotion_score: i32,
}
