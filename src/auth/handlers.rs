use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ApiUserDto, AuthResponseDto, LoginDto},
        jwt::JwtKeys,
        manager,
    },
    error::AppError,
    state::AppState,
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account/register", post(register))
        .route("/account/login", post(login))
        .route("/account/refreshtoken", post(refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<ApiUserDto>,
) -> Result<Response, AppError> {
    info!(email = %payload.email, "registration attempt");

    let errors = manager::register(&state.db, &payload).await?;
    if !errors.is_empty() {
        warn!(email = %payload.email, count = errors.len(), "registration rejected");
        return Ok((StatusCode::BAD_REQUEST, Json(errors)).into_response());
    }

    Ok(StatusCode::OK.into_response())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginDto>,
) -> Result<Json<AuthResponseDto>, AppError> {
    info!(email = %payload.email, "login attempt");

    let keys = JwtKeys::from_ref(&state);
    match manager::login(&state.db, &keys, &payload).await? {
        Some(response) => {
            info!(user_id = %response.user_id, "user logged in");
            Ok(Json(response))
        }
        None => {
            warn!(email = %payload.email, "login rejected");
            Err(AppError::Unauthorized("Invalid credentials".into()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<AuthResponseDto>,
) -> Result<Json<AuthResponseDto>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    match manager::verify_refresh_token(&state.db, &keys, &payload).await? {
        Some(response) => Ok(Json(response)),
        None => Err(AppError::Unauthorized("Invalid refresh token".into())),
    }
}
