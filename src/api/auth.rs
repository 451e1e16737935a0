//! Login API handler
//!
//! Plaintext credential comparison against the `users` table; auth is
//! deliberately simple glue, as in the original service.

use crate::db::Db;
use crate::error::AppError;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Profile name
    pub perfil: String,
    /// Plaintext password
    pub contrasena: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Human-readable outcome message
    pub msg: String,
    /// Authenticated profile name
    pub perfil: String,
    /// Opaque session token (fresh UUID per login)
    pub token: String,
}

/// POST /api/login - Authenticate a profile
pub async fn login(
    State(db): State<Db>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = db
        .find_user(&request.perfil, &request.contrasena)
        .await?
        .ok_or(AppError::Unauthorized)?;

    info!("Login: {}", user.perfil);
    Ok(Json(LoginResponse {
        msg: "Login exitoso".to_string(),
        perfil: user.perfil,
        token: Uuid::new_v4().to_string(),
    }))
}
