use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub mod prompt;

/// Emotion label for entries the model could not analyze.
pub const UNANALYZABLE: &str = "ไม่สามารถวิเคราะห์ได้";
/// Stand-in for fields the model omitted from an otherwise valid reply.
pub const NOT_AVAILABLE: &str = "N/A";

const NEUTRAL_SCORE: i32 = 50;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The three classifier-owned fields of an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub emotion: String,
    pub summary: String,
    pub emotion_score: i32,
}

impl Verdict {
    fn degraded(cause: impl std::fmt::Display) -> Self {
        Self {
            emotion: UNANALYZABLE.to_string(),
            summary: format!("เกิดข้อผิดพลาดในการสื่อสารกับ AI: {cause}"),
            emotion_score: NEUTRAL_SCORE,
        }
    }
}

/// Outcome of one classification attempt. Failures degrade instead of
/// erroring: a degraded verdict is still a storable entry, it just carries
/// the neutral score and a diagnostic summary.
#[derive(Debug, Clone)]
pub enum Classification {
    Classified(Verdict),
    Degraded(Verdict),
}

impl Classification {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn into_verdict(self) -> Verdict {
        match self {
            Self::Classified(v) | Self::Degraded(v) => v,
        }
    }
}

// Gemini generateContent reply, reduced to the path we read.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// Reply contract: one JSON object, three fields, each with a defined
// default when absent.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    emotion: Option<String>,
    summary: Option<String>,
    #[serde(rename = "emotionScore")]
    emotion_score: Option<i32>,
}

pub struct EmotionClassifier {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
}

impl EmotionClassifier {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model: model.into(),
            api_url: api_url.into(),
        }
    }

    /// False when no API key is configured. `/analyze` refuses up front in
    /// that case; `classify` itself still degrades rather than panics.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Classifies one submission with a single request, no retries.
    /// Transport errors, non-2xx replies, and junk output all come back as
    /// a degraded verdict.
    pub async fn classify(&self, message: &str, emoji: &str) -> Classification {
        let api_key = match self.api_key.as_deref() {
            Some(key) => key,
            None => {
                return Classification::Degraded(Verdict::degraded(
                    "Gemini API is not configured.",
                ))
            }
        };

        let prompt = prompt::build_prompt(message, emoji);
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);

        let response = match self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }]
            }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Gemini request failed");
                return Classification::Degraded(Verdict::degraded(e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Gemini API returned an error");
            return Classification::Degraded(Verdict::degraded(format!(
                "Gemini API error {status}"
            )));
        }

        let payload: GenerateContentResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Gemini reply body was not valid JSON");
                return Classification::Degraded(Verdict::degraded(e));
            }
        };

        let text = payload
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref());

        match text {
            Some(text) => parse_verdict(text),
            None => Classification::Degraded(Verdict::degraded("empty model reply")),
        }
    }
}

/// Decodes the model's reply text: strips code fences, then parses the
/// strict JSON object. Fields absent from the object default individually;
/// text that still fails to parse degrades.
fn parse_verdict(text: &str) -> Classification {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<RawVerdict>(cleaned) {
        Ok(raw) => Classification::Classified(Verdict {
            emotion: raw.emotion.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            summary: raw.summary.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            emotion_score: raw.emotion_score.unwrap_or(NEUTRAL_SCORE),
        }),
        Err(e) => {
            tracing::warn!(error = %e, "model reply did not match the JSON contract");
            Classification::Degraded(Verdict::degraded(e))
        }
    }
}

// The model wraps replies in ```json fences despite being told not to.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let body = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    body.strip_suffix("```").unwrap_or(body).trim()
}
