//! School API handlers

use crate::db::Db;
use crate::error::AppError;
use crate::models::{new_id, School};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

/// Create school request
#[derive(Debug, Deserialize)]
pub struct CreateSchoolRequest {
    /// School name (must be unique)
    pub nombre: String,
    /// Official school registry code
    pub rbd: String,
    /// Tax identifier
    pub rut: String,
    /// Street address
    #[serde(default)]
    pub direccion: Option<String>,
    /// Contact phone
    #[serde(default)]
    pub telefono: Option<String>,
    /// Principal name
    #[serde(default)]
    pub director: Option<String>,
    /// Logo / photo URL
    #[serde(default)]
    pub imagen: Option<String>,
}

/// Create school response
#[derive(Debug, Serialize)]
pub struct SchoolCreatedResponse {
    /// Human-readable outcome message
    pub msg: String,
    /// Generated school id
    pub id: String,
}

/// GET /api/colegios - List all schools
pub async fn list_schools(State(db): State<Db>) -> Result<Json<Vec<School>>, AppError> {
    let schools = db.list_schools().await?;
    Ok(Json(schools))
}

/// POST /api/colegios - Create a new school
pub async fn create_school(
    State(db): State<Db>,
    Json(request): Json<CreateSchoolRequest>,
) -> Result<(StatusCode, Json<SchoolCreatedResponse>), AppError> {
    if db.school_name_exists(&request.nombre).await? {
        return Err(AppError::Duplicate(format!("colegio {}", request.nombre)));
    }

    let school = School {
        id: new_id(),
        nombre: request.nombre,
        rbd: request.rbd,
        rut: request.rut,
        direccion: request.direccion,
        telefono: request.telefono,
        director: request.director,
        imagen: request.imagen,
    };
    db.create_school(&school).await?;

    Ok((
        StatusCode::CREATED,
        Json(SchoolCreatedResponse {
            msg: "Colegio creado".to_string(),
            id: school.id,
        }),
    ))
}
