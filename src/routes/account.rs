//! Account route handlers
//!
//! Login and registration. Neither requires a token.

use super::ValidatedJson;
use crate::auth::{hash_password, verify_password, Permissions, TokenSubject};
use crate::error::{ApiResult, AppError};
use crate::models::{LoginRequest, LoginResponse, NewAccount, RegisterRequest, RegisterResponse};
use crate::state::{AppState, SharedState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

/// POST /api/v1/login
///
/// Any failure, including a malformed body or a store error, is reported
/// as 401.
pub async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let Json(req) = payload.map_err(|e| AppError::Unauthenticated(e.body_text()))?;

    let access_token = issue_for_credentials(&state, &req).await.map_err(|e| match e {
        e @ AppError::Unauthenticated(_) => e,
        other => AppError::Unauthenticated(other.to_string()),
    })?;

    Ok((StatusCode::CREATED, Json(LoginResponse { access_token })))
}

async fn issue_for_credentials(state: &AppState, req: &LoginRequest) -> Result<String, AppError> {
    let account = state
        .accounts
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::Unauthenticated(format!("Unknown username '{}'", req.username)))?;

    if !verify_password(&req.password, &account.password_hash)? {
        return Err(AppError::Unauthenticated(format!(
            "Wrong password for '{}'",
            req.username
        )));
    }

    let time_tracker = state.time_trackers.find_by_user(account.id).await?;

    let access_token = state.tokens.issue(&TokenSubject {
        user_id: account.id.to_string(),
        time_tracker_id: time_tracker.map(|t| t.id.to_string()),
        username: account.username,
        email: account.email,
        permission_level: account.permission_level,
    })?;

    info!("User {} logged in", account.id);
    Ok(access_token)
}

/// POST /api/v1/register
///
/// Creates the account and its time tracker. If the tracker cannot be
/// created the account is removed again.
pub async fn register(
    State(state): State<SharedState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let password_hash = hash_password(&req.password, state.bcrypt_cost)?;

    let account = state
        .accounts
        .create(NewAccount {
            username: req.username,
            password_hash,
            email: req.email,
            permission_level: Permissions::DEFAULT_ACCOUNT,
        })
        .await?;

    if let Err(e) = state.time_trackers.create(account.id).await {
        warn!("Rolling back account {}: time tracker creation failed: {}", account.id, e);
        state.accounts.delete(account.id).await?;
        return Err(e);
    }

    info!("Registered account {} ({})", account.id, account.username);

    Ok((StatusCode::CREATED, Json(RegisterResponse { id: account.id })))
}
