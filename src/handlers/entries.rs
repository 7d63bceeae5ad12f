use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::config::StorageBackend;
use crate::error::{AppError, AppResult};
use crate::models::entry::{AnalyzeRequest, EmotionEntry, SaveEntryRequest};
use crate::models::risk::RiskAssessment;
use crate::services::{history, ingestion};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
    pub entry: EmotionEntry,
}

#[derive(Debug, Serialize)]
pub struct History7Response {
    pub history7: Vec<EmotionEntry>,
    #[serde(rename = "averageScore")]
    pub average_score: f64,
    pub risk: RiskAssessment,
}

#[derive(Debug, Serialize)]
pub struct History90Response {
    pub history90: Vec<EmotionEntry>,
    #[serde(rename = "averageScore")]
    pub average_score: f64,
    pub risk: RiskAssessment,
}

// The file backend is single-tenant: entries written there carry no owner.
fn entry_owner(state: &AppState, auth_user: &AuthUser) -> Option<Uuid> {
    match state.config.storage {
        StorageBackend::Postgres { .. } => Some(auth_user.id),
        StorageBackend::File { .. } => None,
    }
}

/// POST /analyze — classify a submission without persisting it. A degraded
/// verdict still carries the full entry body (the client may save it via
/// /save), just under a 500 status.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Response> {
    if !state.classifier.is_configured() {
        return Err(AppError::ClassifierUnconfigured);
    }

    let ingested = ingestion::ingest(
        &state.classifier,
        entry_owner(&state, &auth_user),
        &body.message,
        &body.emoji,
        Utc::now().date_naive(),
    )
    .await?;

    let status = if ingested.degraded {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    Ok((status, Json(ingested.entry)).into_response())
}

/// POST /save — the only write path. Classification fields come from the
/// client (a prior /analyze response); the date is re-stamped server-side.
pub async fn save_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SaveEntryRequest>,
) -> AppResult<Json<SaveResponse>> {
    let entry = ingestion::compose_direct(
        entry_owner(&state, &auth_user),
        body,
        Utc::now().date_naive(),
    )?;

    state.store.append(&entry).await?;

    Ok(Json(SaveResponse {
        status: "saved",
        entry,
    }))
}

/// GET /history — the latest 30 entries, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<EmotionEntry>>> {
    let entries = history::latest(state.store.as_ref(), auth_user.id, 30).await?;
    Ok(Json(entries))
}

/// GET /history7 — the trailing 7-day window with its average and risk band.
pub async fn history7(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<History7Response>> {
    let window = history::aggregate(
        state.store.as_ref(),
        auth_user.id,
        7,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(History7Response {
        history7: window.entries,
        average_score: window.average_score,
        risk: window.risk,
    }))
}

/// GET /history90 — same aggregation over the trailing 90 days.
pub async fn history90(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<History90Response>> {
    let window = history::aggregate(
        state.store.as_ref(),
        auth_user.id,
        90,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(History90Response {
        history90: window.entries,
        average_score: window.average_score,
        risk: window.risk,
    }))
}

/// GET /stats — summary numbers over the trailing 90 days: entry count,
/// rounded mean, score extremes, distinct journaled days, and the most
/// frequent emotion.
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<history::EmotionStats>> {
    let stats = history::stats(
        state.store.as_ref(),
        auth_user.id,
        90,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(stats))
}
