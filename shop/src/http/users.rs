use super::AppState;
use super::error::ApiError;
use crate::api_model::{IdResponse, LoginRequest, LoginResponse, RefreshRequest, RegisterRequest};
use crate::db_model::NewUser;
use auth::TokenPair;
use auth::password;
use axum::{Json, extract::State, http::StatusCode};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

const INVALID_CREDENTIALS: &str = "invalid email or password";

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    if !EMAIL_RE.is_match(&req.email) {
        return Err(ApiError::Validation("invalid email address".to_string()));
    }
    password::validate_password(&req.password)?;

    let password_hash = password::hash_password(&req.password, state.bcrypt_cost).await?;

    let id = state
        .users
        .create_user(&NewUser {
            email: req.email.clone(),
            password_hash,
            is_admin: req.is_admin,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    counter!("shop_backend_registrations_total").increment(1);
    info!(user_id = id, "registered user {}", req.email);

    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Unknown email and wrong password produce the same response on purpose.
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let matches = password::verify_password(&req.password, &user.password_hash).await?;
    if !matches {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let tokens = state.tokens.issue_pair(user.id, user.is_admin)?;
    info!(user_id = user.id, "login succeeded");

    Ok(Json(LoginResponse {
        user_id: user.id,
        is_admin: user.is_admin,
        token: tokens.token,
        refresh_token: tokens.refresh_token,
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state.tokens.refresh(&req.refresh_token)?;
    Ok(Json(pair))
}
