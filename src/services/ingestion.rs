use chrono::NaiveDate;
use uuid::Uuid;

use crate::classifier::EmotionClassifier;
use crate::error::{AppError, AppResult};
use crate::models::entry::{EmotionEntry, SaveEntryRequest};

/// A message/emoji pair that survived validation, trimmed.
#[derive(Debug, PartialEq)]
pub struct Submission {
    pub message: String,
    pub emoji: String,
}

/// The single validation gate for inbound submissions, shared by the
/// classify path and the direct-save path. Message is checked before
/// emoji; both must be non-empty after trimming.
pub fn validate_submission(message: &str, emoji: &str) -> AppResult<Submission> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Missing message".into()));
    }

    let emoji = emoji.trim();
    if emoji.is_empty() {
        return Err(AppError::Validation("Missing emoji".into()));
    }

    Ok(Submission {
        message: message.to_string(),
        emoji: emoji.to_string(),
    })
}

/// An ingested entry plus whether classification had to degrade.
#[derive(Debug)]
pub struct Ingested {
    pub entry: EmotionEntry,
    pub degraded: bool,
}

/// Classify-and-compose: validates, runs the classifier, stamps the server
/// date. Classification failures fold into the entry as a degraded verdict
/// rather than surfacing as ingestion errors. `owner` is `None` in
/// single-tenant mode, where entries carry no owner field.
pub async fn ingest(
    classifier: &EmotionClassifier,
    owner: Option<Uuid>,
    message: &str,
    emoji: &str,
    today: NaiveDate,
) -> AppResult<Ingested> {
    let submission = validate_submission(message, emoji)?;

    let outcome = classifier
        .classify(&submission.message, &submission.emoji)
        .await;
    let degraded = outcome.is_degraded();
    let verdict = outcome.into_verdict();

    Ok(Ingested {
        entry: EmotionEntry {
            date: today,
            message: submission.message,
            emoji: submission.emoji,
            emotion: verdict.emotion,
            summary: verdict.summary,
            emotion_score: verdict.emotion_score,
            user_id: owner,
        },
        degraded,
    })
}

/// Direct-save composition: classification fields arrive from the client
/// (a prior `/analyze` response) and are kept as-is, scores included. Only
/// the date is stamped here — any client-sent date was already dropped at
/// deserialization.
pub fn compose_direct(
    owner: Option<Uuid>,
    req: SaveEntryRequest,
    today: NaiveDate,
) -> AppResult<EmotionEntry> {
    let submission = validate_submission(&req.message, &req.emoji)?;

    Ok(EmotionEntry {
        date: today,
        message: submission.message,
        emoji: submission.emoji,
        emotion: req.emotion,
        summary: req.summary,
        emotion_score: req.emotion_score,
        user_id: owner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::UNANALYZABLE;
    use crate::store::{EntryStore, FileEntryStore};

    fn day(date: &str) -> NaiveDate {
        date.parse().unwrap()
    }

    #[test]
    fn test_empty_message_is_rejected_before_emoji() {
        let err = validate_submission("", "😀").unwrap_err();
        assert_eq!(err.to_string(), "Missing message");

        // both empty still reports the message first
        let err = validate_submission("   ", "").unwrap_err();
        assert_eq!(err.to_string(), "Missing message");
    }

    #[test]
    fn test_empty_emoji_is_rejected() {
        let err = validate_submission("hi", "").unwrap_err();
        assert_eq!(err.to_string(), "Missing emoji");

        let err = validate_submission("hi", "  ").unwrap_err();
        assert_eq!(err.to_string(), "Missing emoji");
    }

    #[test]
    fn test_inputs_are_trimmed() {
        let submission = validate_submission("  วันนี้เหนื่อย ", " 😞 ").unwrap();
        assert_eq!(submission.message, "วันนี้เหนื่อย");
        assert_eq!(submission.emoji, "😞");
    }

    #[tokio::test]
    async fn test_degraded_classification_still_composes_an_entry() {
        let classifier = EmotionClassifier::new(None, "gemini-2.0-flash", "http://127.0.0.1:9");
        let owner = Uuid::new_v4();

        let ingested = ingest(
            &classifier,
            Some(owner),
            "วันนี้เหนื่อยมาก",
            "😞",
            day("2024-03-10"),
        )
        .await
        .unwrap();

        assert!(ingested.degraded);
        assert_eq!(ingested.entry.date, day("2024-03-10"));
        assert_eq!(ingested.entry.message, "วันนี้เหนื่อยมาก");
        assert_eq!(ingested.entry.emotion, UNANALYZABLE);
        assert_eq!(ingested.entry.emotion_score, 50);
        assert_eq!(ingested.entry.user_id, Some(owner));
        assert!(!ingested.entry.summary.is_empty());
    }

    #[tokio::test]
    async fn test_degraded_entries_are_storable() {
        let classifier = EmotionClassifier::new(None, "gemini-2.0-flash", "http://127.0.0.1:9");
        let dir = tempfile::tempdir().unwrap();
        let store = FileEntryStore::new(dir.path().join("history.json"));

        let ingested = ingest(&classifier, None, "hi", "🙂", day("2024-03-10"))
            .await
            .unwrap();
        store.append(&ingested.entry).await.unwrap();

        let listed = store.list_for_user(Uuid::nil(), None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].emotion, UNANALYZABLE);
        assert_eq!(listed[0].emotion_score, 50);
    }

    #[test]
    fn test_direct_save_keeps_client_fields_and_stamps_the_date() {
        let req: SaveEntryRequest = serde_json::from_str(
            r#"{
                "message": "สอบผ่านแล้ว",
                "emoji": "🎉",
                "emotion": "ดีใจ",
                "summary": "ผู้เขียนดีใจที่สอบผ่าน",
                "emotionScore": 999,
                "date": "1999-01-01"
            }"#,
        )
        .unwrap();

        let entry = compose_direct(None, req, day("2024-03-10")).unwrap();

        assert_eq!(entry.date, day("2024-03-10"));
        assert_eq!(entry.emotion, "ดีใจ");
        assert_eq!(entry.user_id, None);
        // out-of-range scores are preserved, not clamped
        assert_eq!(entry.emotion_score, 999);
    }

    #[test]
    fn test_direct_save_runs_the_same_validation_gate() {
        let req: SaveEntryRequest =
            serde_json::from_str(r#"{"message":"", "emoji":"🎉"}"#).unwrap();
        let err = compose_direct(None, req, day("2024-03-10")).unwrap_err();
        assert_eq!(err.to_string(), "Missing message");
    }
}
