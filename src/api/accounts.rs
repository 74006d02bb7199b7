use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::api::state::AppState;
use crate::db::UserRepository;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Single-round unsalted SHA-256, hex encoded — the format stored in the
/// users table.
pub(crate) fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let digest = password_digest(&req.password);

    match UserRepository::create(&state.db, &req.email, &digest).await {
        Ok(user_id) => {
            tracing::info!(user_id, "Registered new user");
            Ok(Json(json!({
                "success": true,
                "user_id": user_id,
                "email": req.email,
            })))
        }
        Err(err @ AppError::DuplicateEmail) => Ok(Json(json!({
            "success": false,
            "error": err.to_string(),
        }))),
        Err(e) => Err(e),
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let digest = password_digest(&req.password);

    match UserRepository::find_by_credentials(&state.db, &req.email, &digest).await? {
        Some(user) => Ok(Json(json!({
            "success": true,
            "user_id": user.id,
            "email": user.email,
        }))),
        None => Ok(Json(json!({
            "success": false,
            "error": AppError::InvalidCredentials.to_string(),
        }))),
    }
}
