//! Plan (PME) API handlers
//!
//! Covers lookup, creation (with optional prior-year cloning), update,
//! cascade delete and the per-school listing.

use super::MessageResponse;
use crate::db::Db;
use crate::error::AppError;
use crate::models::Plan;
use crate::services::clone;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

/// Query parameters for the plan lookup
#[derive(Debug, Deserialize)]
pub struct SearchPlanQuery {
    /// School id
    pub id_colegio: String,
    /// Plan year
    pub year: i64,
}

/// Plan lookup response
#[derive(Debug, Serialize)]
pub struct SearchPlanResponse {
    /// Whether a plan exists for the (school, year) pair
    pub exist: bool,
    /// Plan id when it exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_pme: Option<String>,
    /// Explanation when it does not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// Create plan request
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    /// Plan year
    pub year: i64,
    /// Owning school id
    pub id_colegio: String,
    /// Plan director
    pub director: String,
    /// Free-form observation
    pub observacion: String,
    /// Copy last year's actions and resources into the new plan
    #[serde(default)]
    pub clonar: bool,
}

/// Create plan response
#[derive(Debug, Serialize)]
pub struct PlanCreatedResponse {
    /// Human-readable outcome message
    pub msg: String,
    /// Generated plan id
    pub id_pme: String,
    /// Number of actions cloned from the previous year
    pub copiados: usize,
}

/// Update plan request
#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    /// Plan director
    pub director: String,
    /// Free-form observation
    pub observacion: String,
}

/// GET /api/pme/buscar - Find the plan of a school for a year
pub async fn search_plan(
    State(db): State<Db>,
    Query(query): Query<SearchPlanQuery>,
) -> Result<Json<SearchPlanResponse>, AppError> {
    let response = match db
        .find_plan_by_school_year(&query.id_colegio, query.year)
        .await?
    {
        Some(plan) => SearchPlanResponse {
            exist: true,
            id_pme: Some(plan.id),
            msg: None,
        },
        None => SearchPlanResponse {
            exist: false,
            id_pme: None,
            msg: Some("No se encontró PME".to_string()),
        },
    };

    Ok(Json(response))
}

/// POST /api/pme - Create a plan, optionally cloning the previous year
pub async fn create_plan(
    State(db): State<Db>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanCreatedResponse>), AppError> {
    if db
        .find_plan_by_school_year(&request.id_colegio, request.year)
        .await?
        .is_some()
    {
        return Err(AppError::Duplicate(format!(
            "PME {} del colegio {}",
            request.year, request.id_colegio
        )));
    }

    let plan = Plan::new(
        request.year,
        request.id_colegio,
        request.director,
        request.observacion,
    );

    // The copy and the plan land in one transaction, so a failed clone
    // leaves no half-populated plan behind
    let (cloned_actions, cloned_resources) = if request.clonar {
        clone::previous_year_copy(&db, &plan).await?
    } else {
        (Vec::new(), Vec::new())
    };
    let copiados = cloned_actions.len();
    db.create_plan(&plan, &cloned_actions, &cloned_resources)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlanCreatedResponse {
            msg: "Creado".to_string(),
            id_pme: plan.id,
            copiados,
        }),
    ))
}

/// PUT /api/pme/:id_pme - Update director and observation
pub async fn update_plan(
    State(db): State<Db>,
    Path(id_pme): Path<String>,
    Json(request): Json<UpdatePlanRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let updated = db
        .update_plan(&id_pme, &request.director, &request.observacion)
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!("PME {id_pme}")));
    }

    Ok(Json(MessageResponse::new("PME Actualizado")))
}

/// DELETE /api/pme/:id_pme - Delete a plan and all its actions and resources
pub async fn delete_plan(
    State(db): State<Db>,
    Path(id_pme): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = db.delete_plan_cascade(&id_pme).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("PME {id_pme}")));
    }

    Ok(Json(MessageResponse::new(
        "PME y todos sus datos eliminados correctamente",
    )))
}

/// GET /api/pmes/colegio/:id_colegio - All plans of a school, newest first
pub async fn list_plans_by_school(
    State(db): State<Db>,
    Path(id_colegio): Path<String>,
) -> Result<Json<Vec<Plan>>, AppError> {
    let plans = db.list_plans_by_school(&id_colegio).await?;
    Ok(Json(plans))
}
