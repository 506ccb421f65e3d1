// src/auth/handlers.rs

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::{info, warn};

use super::extract::{CurrentUser, SESSION_COOKIE, session_token};
use super::types::{IdentityClaims, SessionGrant, User};
use crate::api::error::{ApiError, ApiResult};
use crate::config::EcoConfig;
use crate::state::SharedState;

pub const IDENTITY_SECRET_HEADER: &str = "x-identity-secret";

fn secrets_match(expected: &str, given: &str) -> bool {
    let (a, b) = (expected.as_bytes(), given.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn session_cookie(config: &EcoConfig, token: &str, max_age: i64) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}");
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Called by the identity provider integration once it has verified a login.
pub async fn identity_callback_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(claims): Json<IdentityClaims>,
) -> ApiResult<impl IntoResponse> {
    let config = &state.config;
    if !config.identity_enabled() {
        return Err(ApiError::service_unavailable("Identity provider is not configured"));
    }

    let given = headers
        .get(IDENTITY_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing identity secret"))?;
    if !secrets_match(&config.identity_secret, given) {
        warn!("Identity callback rejected: secret mismatch");
        return Err(ApiError::unauthorized("Invalid identity secret"));
    }

    let is_admin = config.is_admin_email(claims.email.as_deref());
    let user = state.user_store.upsert_user(&claims, is_admin).await?;
    let (token, expires_at) = state
        .user_store
        .create_session(&user.id, config.session_ttl_secs())
        .await?;

    info!(user_id = %user.id, is_admin = user.is_admin, "User signed in");

    let cookie = session_cookie(config, &token, config.session_ttl_secs());
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(SessionGrant { token, expires_at, user }),
    ))
}

pub async fn current_user_handler(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn logout_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        if state.user_store.delete_session(&token).await? {
            info!("Session ended");
        }
    }

    let cookie = session_cookie(&state.config, "", 0);
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}
