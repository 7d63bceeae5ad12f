use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::classifier::NOT_AVAILABLE;
use crate::models::entry::EmotionEntry;
use crate::models::risk::RiskAssessment;
use crate::store::{EntryStore, StoreError};

/// Trailing-window view over one user's history: the surviving entries,
/// their mean score, and the derived risk band.
#[derive(Debug)]
pub struct HistoryWindow {
    pub entries: Vec<EmotionEntry>,
    pub average_score: f64,
    pub risk: RiskAssessment,
}

/// Summary numbers over one user's trailing window. Serialized as-is, so
/// the field names are the wire names.
#[derive(Debug, Serialize)]
pub struct EmotionStats {
    pub total_entries: usize,
    pub average_score: f64,
    pub highest_score: i32,
    pub lowest_score: i32,
    pub days_with_entries: usize,
    pub most_common_emotion: String,
}

impl EmotionStats {
    fn empty() -> Self {
        Self {
            total_entries: 0,
            average_score: 0.0,
            highest_score: 0,
            lowest_score: 0,
            days_with_entries: 0,
            most_common_emotion: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Aggregates the inclusive range `[today - (window_days - 1), today]`, so
/// a 7-day window spans exactly 7 calendar dates ending today.
///
/// The store pre-filters from the window start; entries are re-checked
/// against both bounds here so backends that return extra or future-dated
/// rows never leak into the average. An empty window reports an average of
/// exactly 0, which is scored like any other average and lands in the high
/// band.
pub async fn aggregate(
    store: &dyn EntryStore,
    user_id: Uuid,
    window_days: u32,
    today: NaiveDate,
) -> Result<HistoryWindow, StoreError> {
    let start = today - Duration::days(i64::from(window_days) - 1);

    let mut entries = store.list_for_user(user_id, Some(start)).await?;
    entries.retain(|e| e.date >= start && e.date <= today);

    let average_score = if entries.is_empty() {
        0.0
    } else {
        let total: i64 = entries.iter().map(|e| i64::from(e.emotion_score)).sum();
        total as f64 / entries.len() as f64
    };

    Ok(HistoryWindow {
        entries,
        average_score,
        risk: RiskAssessment::for_average(average_score),
    })
}

/// Summarizes the same inclusive window as [`aggregate`]: entry count, mean
/// score rounded to two decimals, score extremes, count of distinct
/// journaled dates, and the emotion that appears most often (the first
/// label to reach the top count wins a tie). An empty window yields the
/// zeroed shape with an "N/A" emotion rather than an error.
pub async fn stats(
    store: &dyn EntryStore,
    user_id: Uuid,
    window_days: u32,
    today: NaiveDate,
) -> Result<EmotionStats, StoreError> {
    let start = today - Duration::days(i64::from(window_days) - 1);

    let mut entries = store.list_for_user(user_id, Some(start)).await?;
    entries.retain(|e| e.date >= start && e.date <= today);

    if entries.is_empty() {
        return Ok(EmotionStats::empty());
    }

    let total: i64 = entries.iter().map(|e| i64::from(e.emotion_score)).sum();
    let average = total as f64 / entries.len() as f64;

    let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    dates.sort_unstable();
    dates.dedup();

    // Occurrence counts in first-seen order, so a tie resolves to the
    // label encountered earliest in the listing.
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for e in &entries {
        if e.emotion.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(label, _)| *label == e.emotion) {
            Some((_, n)) => *n += 1,
            None => counts.push((e.emotion.as_str(), 1)),
        }
    }
    let mut most_common_emotion = NOT_AVAILABLE.to_string();
    let mut top = 0;
    for (label, n) in &counts {
        if *n > top {
            top = *n;
            most_common_emotion = (*label).to_string();
        }
    }

    Ok(EmotionStats {
        total_entries: entries.len(),
        average_score: (average * 100.0).round() / 100.0,
        highest_score: entries.iter().map(|e| e.emotion_score).max().unwrap_or(0),
        lowest_score: entries.iter().map(|e| e.emotion_score).min().unwrap_or(0),
        days_with_entries: dates.len(),
        most_common_emotion,
    })
}

/// Unwindowed "latest N" listing: newest first, truncated to `limit`.
pub async fn latest(
    store: &dyn EntryStore,
    user_id: Uuid,
    limit: usize,
) -> Result<Vec<EmotionEntry>, StoreError> {
    let mut entries = store.list_for_user(user_id, None).await?;
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries.truncate(limit);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::risk::RiskLevel;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemStore {
        entries: Mutex<Vec<EmotionEntry>>,
    }

    impl MemStore {
        fn seeded(entries: Vec<EmotionEntry>) -> Self {
            Self {
                entries: Mutex::new(entries),
            }
        }
    }

    #[async_trait]
    impl EntryStore for MemStore {
        async fn append(&self, entry: &EmotionEntry) -> Result<(), StoreError> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn list_for_user(
            &self,
            _user_id: Uuid,
            since: Option<NaiveDate>,
        ) -> Result<Vec<EmotionEntry>, StoreError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| since.map_or(true, |s| e.date >= s))
                .cloned()
                .collect())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn entry(date: &str, score: i32) -> EmotionEntry {
        EmotionEntry {
            date: date.parse().unwrap(),
            message: format!("entry {date}"),
            emoji: "🙂".into(),
            emotion: "เฉยๆ".into(),
            summary: "ok".into(),
            emotion_score: score,
            user_id: None,
        }
    }

    fn feeling(date: &str, score: i32, emotion: &str) -> EmotionEntry {
        let mut e = entry(date, score);
        e.emotion = emotion.into();
        e
    }

    fn day(date: &str) -> NaiveDate {
        date.parse().unwrap()
    }

    #[tokio::test]
    async fn test_seven_day_window_spans_exactly_seven_dates() {
        let store = MemStore::seeded(vec![
            entry("2024-03-03", 10), // one day too old
            entry("2024-03-04", 20), // oldest inside
            entry("2024-03-07", 30),
            entry("2024-03-10", 40), // today
            entry("2024-03-11", 90), // future, excluded
        ]);

        let window = aggregate(&store, Uuid::nil(), 7, day("2024-03-10"))
            .await
            .unwrap();

        let dates: Vec<String> = window.entries.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-04", "2024-03-07", "2024-03-10"]);
        assert_eq!(window.average_score, 30.0);
    }

    #[tokio::test]
    async fn test_empty_window_reports_zero_average_and_high_risk() {
        let store = MemStore::default();

        let window = aggregate(&store, Uuid::nil(), 7, day("2024-03-10"))
            .await
            .unwrap();

        assert!(window.entries.is_empty());
        assert_eq!(window.average_score, 0.0);
        assert_eq!(window.risk.level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_average_is_the_arithmetic_mean_of_surviving_scores() {
        let store = MemStore::seeded(vec![
            entry("2024-03-09", 65),
            entry("2024-03-10", 80),
        ]);

        let window = aggregate(&store, Uuid::nil(), 7, day("2024-03-10"))
            .await
            .unwrap();

        assert_eq!(window.average_score, 72.5);
        assert_eq!(window.risk.level, RiskLevel::Normal);
    }

    #[tokio::test]
    async fn test_ninety_day_window_keeps_the_same_inclusive_bounds() {
        let store = MemStore::seeded(vec![
            entry("2023-12-12", 10), // window start for today = 2024-03-10
            entry("2023-12-11", 90), // one day too old
        ]);

        let window = aggregate(&store, Uuid::nil(), 90, day("2024-03-10"))
            .await
            .unwrap();

        assert_eq!(window.entries.len(), 1);
        assert_eq!(window.entries[0].date, day("2023-12-12"));
    }

    #[tokio::test]
    async fn test_stats_empty_history_is_zeroed_with_na_emotion() {
        let store = MemStore::default();

        let stats = stats(&store, Uuid::nil(), 90, day("2024-03-10"))
            .await
            .unwrap();

        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.highest_score, 0);
        assert_eq!(stats.lowest_score, 0);
        assert_eq!(stats.days_with_entries, 0);
        assert_eq!(stats.most_common_emotion, "N/A");
    }

    #[tokio::test]
    async fn test_stats_summarizes_counts_extremes_and_most_common_emotion() {
        let store = MemStore::seeded(vec![
            feeling("2024-03-08", 30, "เศร้า"),
            feeling("2024-03-09", 85, "ดีใจ"),
            feeling("2024-03-09", 40, "เศร้า"), // second entry on the same day
        ]);

        let stats = stats(&store, Uuid::nil(), 90, day("2024-03-10"))
            .await
            .unwrap();

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.average_score, 51.67); // 155/3 rounded to 2 decimals
        assert_eq!(stats.highest_score, 85);
        assert_eq!(stats.lowest_score, 30);
        assert_eq!(stats.days_with_entries, 2);
        assert_eq!(stats.most_common_emotion, "เศร้า");
    }

    #[tokio::test]
    async fn test_stats_tie_keeps_the_first_emotion_seen() {
        let store = MemStore::seeded(vec![
            feeling("2024-03-09", 60, "ดีใจ"),
            feeling("2024-03-10", 20, "เศร้า"),
        ]);

        let stats = stats(&store, Uuid::nil(), 90, day("2024-03-10"))
            .await
            .unwrap();

        assert_eq!(stats.most_common_emotion, "ดีใจ");
    }

    #[tokio::test]
    async fn test_stats_window_uses_the_same_inclusive_bounds() {
        let store = MemStore::seeded(vec![
            feeling("2023-12-11", 5, "เศร้า"), // one day older than the 90-day window
            feeling("2024-03-10", 70, "ดีใจ"),
        ]);

        let stats = stats(&store, Uuid::nil(), 90, day("2024-03-10"))
            .await
            .unwrap();

        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.average_score, 70.0);
        assert_eq!(stats.highest_score, 70);
        assert_eq!(stats.lowest_score, 70);
        assert_eq!(stats.most_common_emotion, "ดีใจ");
    }

    #[tokio::test]
    async fn test_latest_sorts_newest_first_and_truncates() {
        let mut seeded = Vec::new();
        for d in 1..=31 {
            seeded.push(entry(&format!("2024-03-{d:02}"), 50));
        }
        let store = MemStore::seeded(seeded);

        let listed = latest(&store, Uuid::nil(), 30).await.unwrap();

        assert_eq!(listed.len(), 30);
        assert_eq!(listed[0].date, day("2024-03-31"));
        assert_eq!(listed[29].date, day("2024-03-02"));
    }

    #[tokio::test]
    async fn test_store_failure_is_not_an_empty_window() {
        struct DownStore;

        #[async_trait]
        impl EntryStore for DownStore {
            async fn append(&self, _entry: &EmotionEntry) -> Result<(), StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }

            async fn list_for_user(
                &self,
                _user_id: Uuid,
                _since: Option<NaiveDate>,
            ) -> Result<Vec<EmotionEntry>, StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }

            async fn ping(&self) -> Result<(), StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }
        }

        let result = aggregate(&DownStore, Uuid::nil(), 7, day("2024-03-10")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
