//! API module
//!
//! Contains HTTP request handlers for the PME record endpoints and the
//! router that wires them together.

pub mod actions;
pub mod auth;
pub mod plans;
pub mod resources;
pub mod schools;

use crate::db::Db;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

/// Uploaded spreadsheets above this size are rejected
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Generic `{msg}` response used by mutating endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome message
    pub msg: String,
}

impl MessageResponse {
    /// Build a message response
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Build an xlsx attachment response
pub(crate) fn xlsx_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("API Orquestador PME"))
}

/// Assemble the application router over a database handle
pub fn router(db: Db) -> Router {
    Router::new()
        // Health check
        .route("/", get(root))
        .route("/api/health", get(health_check))
        // Auth
        .route("/api/login", post(auth::login))
        // Schools
        .route(
            "/api/colegios",
            get(schools::list_schools).post(schools::create_school),
        )
        // Plans
        .route("/api/pme/buscar", get(plans::search_plan))
        .route("/api/pme", post(plans::create_plan))
        .route(
            "/api/pme/:id_pme",
            put(plans::update_plan).delete(plans::delete_plan),
        )
        .route("/api/pmes/colegio/:id_colegio", get(plans::list_plans_by_school))
        // Actions
        .route("/api/acciones", post(actions::create_action))
        .route("/api/acciones/importar_excel", post(actions::import_actions))
        .route("/api/acciones/exportar/:id_pme", get(actions::export_actions))
        .route(
            "/api/acciones/:key",
            get(actions::list_actions)
                .put(actions::update_action)
                .delete(actions::delete_action),
        )
        // Resources
        .route("/api/recursos", post(resources::create_resource))
        .route(
            "/api/recursos/importar_excel",
            post(resources::import_resources),
        )
        .route("/api/recursos/pme/:id_pme", get(resources::list_by_plan))
        .route(
            "/api/recursos/exportar_custom/:id_pme",
            post(resources::export_plan_resources),
        )
        .route(
            "/api/recursos/exportar_custom_accion/:uuid_accion",
            post(resources::export_action_resources),
        )
        .route(
            "/api/recursos/:key",
            get(resources::list_by_action)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(db)
}
