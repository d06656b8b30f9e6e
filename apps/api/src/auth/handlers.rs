use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::claims::ClaimPair;
use crate::auth::gate::{AnyIdentity, Authorized};
use crate::auth::service::RegistrationRequest;
use crate::errors::AppError;
use crate::state::AppState;

pub const SIGNED_IN_MESSAGE: &str = "Successfully signed in.";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/authentication/login
pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = body?;
    let issued = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse {
        message: SIGNED_IN_MESSAGE.to_string(),
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// POST /api/authentication/register
pub async fn handle_register(
    State(state): State<AppState>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = body?;
    let confirmation = state.auth.register(&req).await?;
    Ok(Json(MessageResponse {
        message: confirmation.message.to_string(),
    }))
}

/// GET /api/authentication/user-claims
pub async fn handle_user_claims(caller: Authorized<AnyIdentity>) -> Json<Vec<ClaimPair>> {
    Json(caller.claims().to_pairs())
}
