use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    jwt::{create_session_token, SessionToken},
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::error::{AppError, AppResult};
use crate::models::user::{User, UserProfile};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// Account routes are only mounted in postgres mode, so the pool is present
// whenever these handlers run; the check keeps that invariant explicit.
fn accounts_db(state: &AppState) -> AppResult<&PgPool> {
    state.db.as_ref().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "user accounts require the postgres backend"
        ))
    })
}

fn session_secret(state: &AppState) -> AppResult<&str> {
    state
        .config
        .jwt_secret
        .as_deref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not configured")))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<SessionToken>> {
    let db = accounts_db(&state)?;

    let username = body.username.trim();
    if username.is_empty() || body.password.len() < 8 {
        return Err(AppError::Validation(
            "Username required and password must be at least 8 characters".into(),
        ));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(username)
        .fetch_one(db)
        .await?;

    if existing > 0 {
        return Err(AppError::Conflict("Username already registered".into()));
    }

    let pwd_hash = hash_password(&body.password)?;
    let user_id = Uuid::new_v4();

    sqlx::query("INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(username)
        .bind(&pwd_hash)
        .execute(db)
        .await?;

    let token = create_session_token(
        user_id,
        username,
        session_secret(&state)?,
        state.config.jwt_ttl_secs,
    )?;
    Ok(Json(token))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<SessionToken>> {
    let db = accounts_db(&state)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(body.username.trim())
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(db)
        .await?;

    let token = create_session_token(
        user.id,
        &user.username,
        session_secret(&state)?,
        state.config.jwt_ttl_secs,
    )?;
    Ok(Json(token))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let db = accounts_db(&state)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}
