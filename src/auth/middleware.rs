use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

/// Identity every journal handler runs as. File mode stamps the fixed
/// local user; postgres mode resolves it from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// The implicit owner of all entries when running against the file
/// backend, which has no sign-in.
pub fn local_user() -> AuthUser {
    AuthUser {
        id: Uuid::nil(),
        username: "local".to_string(),
    }
}

pub async fn attach_local_user(mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(local_user());
    next.run(req).await
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let secret = state
        .config
        .jwt_secret
        .as_deref()
        .ok_or(AppError::Unauthorized)?;
    let token_data = verify_token(token, secret)?;

    let auth_user = AuthUser {
        id: token_data.claims.sub,
        username: token_data.claims.username,
    };

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}
