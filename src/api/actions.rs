//! Action API handlers
//!
//! CRUD over `uuid_accion`, plus the spreadsheet import and export
//! endpoints of the action list.

use super::{xlsx_response, MessageResponse, MAX_UPLOAD_BYTES};
use crate::db::Db;
use crate::error::AppError;
use crate::models::{new_id, Action};
use crate::services::{export, import};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create action request; optional fields mirror the original schema defaults
#[derive(Debug, Deserialize)]
pub struct CreateActionRequest {
    /// Business key; generated when absent
    #[serde(default)]
    pub uuid_accion: Option<String>,
    /// Owning plan id
    pub id_pme: String,
    /// Plan year
    pub year: i64,
    /// Action name
    pub nombre_accion: String,
    /// Action description
    pub descripcion: String,
    /// Quality dimension
    pub dimension: String,
    /// Sub-dimensions
    #[serde(default)]
    pub subdimensiones: Vec<String>,
    /// Strategic objective
    #[serde(default)]
    pub objetivo_estrategico: Option<String>,
    /// Strategy
    #[serde(default)]
    pub estrategia: Option<String>,
    /// Related institutional plans
    #[serde(default)]
    pub planes: Option<String>,
    /// Responsible person
    #[serde(default)]
    pub responsable: Option<String>,
    /// Resources needed for execution
    #[serde(default)]
    pub recursos_necesarios_ejecucion: Option<String>,
    /// Verification evidence
    #[serde(default)]
    pub medios_verificacion: Option<String>,
    /// SEP subsidy amount
    #[serde(default)]
    pub monto_sep: i64,
    /// Total amount
    #[serde(default)]
    pub monto_total: i64,
}

/// Update action request; absent fields keep their current value
#[derive(Debug, Deserialize, Default)]
pub struct UpdateActionRequest {
    /// Plan year
    pub year: Option<i64>,
    /// Action name
    pub nombre_accion: Option<String>,
    /// Action description
    pub descripcion: Option<String>,
    /// Quality dimension
    pub dimension: Option<String>,
    /// Sub-dimensions
    pub subdimensiones: Option<Vec<String>>,
    /// Strategic objective
    pub objetivo_estrategico: Option<String>,
    /// Strategy
    pub estrategia: Option<String>,
    /// Related institutional plans
    pub planes: Option<String>,
    /// Responsible person
    pub responsable: Option<String>,
    /// Resources needed for execution
    pub recursos_necesarios_ejecucion: Option<String>,
    /// Verification evidence
    pub medios_verificacion: Option<String>,
    /// SEP subsidy amount
    pub monto_sep: Option<i64>,
    /// Total amount
    pub monto_total: Option<i64>,
}

/// Create action response
#[derive(Debug, Serialize)]
pub struct ActionCreatedResponse {
    /// Human-readable outcome message
    pub msg: String,
    /// Business key of the new action
    pub uuid: String,
}

/// Query parameters of the import endpoint
#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// Target plan id
    pub id_pme: String,
    /// Year stamped onto every imported row
    pub year: i64,
}

/// Import response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Human-readable outcome message
    pub msg: String,
    /// Rows inserted
    pub total: usize,
}

/// GET /api/acciones/:id_pme - List the actions of a plan
pub async fn list_actions(
    State(db): State<Db>,
    Path(id_pme): Path<String>,
) -> Result<Json<Vec<Action>>, AppError> {
    let actions = db.list_actions(&id_pme).await?;
    Ok(Json(actions))
}

/// POST /api/acciones - Create a new action
pub async fn create_action(
    State(db): State<Db>,
    Json(request): Json<CreateActionRequest>,
) -> Result<(StatusCode, Json<ActionCreatedResponse>), AppError> {
    if !db.plan_exists(&request.id_pme).await? {
        return Err(AppError::NotFound(format!("PME {}", request.id_pme)));
    }

    let action = Action {
        id: new_id(),
        uuid_accion: request
            .uuid_accion
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        id_pme: request.id_pme,
        year: request.year,
        nombre_accion: request.nombre_accion,
        descripcion: request.descripcion,
        dimension: request.dimension,
        subdimensiones: request.subdimensiones,
        objetivo_estrategico: request.objetivo_estrategico,
        estrategia: request.estrategia,
        planes: request.planes,
        responsable: request.responsable,
        recursos_necesarios_ejecucion: request.recursos_necesarios_ejecucion,
        medios_verificacion: request.medios_verificacion,
        monto_sep: request.monto_sep,
        monto_total: request.monto_total,
        fecha_actualizacion: Utc::now(),
    };
    db.create_action(&action).await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionCreatedResponse {
            msg: "Acción creada".to_string(),
            uuid: action.uuid_accion,
        }),
    ))
}

/// PUT /api/acciones/:uuid - Update an action by business key
pub async fn update_action(
    State(db): State<Db>,
    Path(uuid): Path<String>,
    Json(request): Json<UpdateActionRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut action = db
        .get_action_by_uuid(&uuid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("acción {uuid}")))?;

    if let Some(year) = request.year {
        action.year = year;
    }
    if let Some(nombre_accion) = request.nombre_accion {
        action.nombre_accion = nombre_accion;
    }
    if let Some(descripcion) = request.descripcion {
        action.descripcion = descripcion;
    }
    if let Some(dimension) = request.dimension {
        action.dimension = dimension;
    }
    if let Some(subdimensiones) = request.subdimensiones {
        action.subdimensiones = subdimensiones;
    }
    if let Some(objetivo_estrategico) = request.objetivo_estrategico {
        action.objetivo_estrategico = Some(objetivo_estrategico);
    }
    if let Some(estrategia) = request.estrategia {
        action.estrategia = Some(estrategia);
    }
    if let Some(planes) = request.planes {
        action.planes = Some(planes);
    }
    if let Some(responsable) = request.responsable {
        action.responsable = Some(responsable);
    }
    if let Some(recursos) = request.recursos_necesarios_ejecucion {
        action.recursos_necesarios_ejecucion = Some(recursos);
    }
    if let Some(medios_verificacion) = request.medios_verificacion {
        action.medios_verificacion = Some(medios_verificacion);
    }
    if let Some(monto_sep) = request.monto_sep {
        action.monto_sep = monto_sep;
    }
    if let Some(monto_total) = request.monto_total {
        action.monto_total = monto_total;
    }
    action.fecha_actualizacion = Utc::now();

    db.replace_action(&action).await?;
    Ok(Json(MessageResponse::new("Acción actualizada")))
}

/// DELETE /api/acciones/:uuid - Delete an action and its resources
pub async fn delete_action(
    State(db): State<Db>,
    Path(uuid): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = db.delete_action_cascade(&uuid).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("acción {uuid}")));
    }

    Ok(Json(MessageResponse::new("Acción eliminada")))
}

/// POST /api/acciones/importar_excel - Import actions from an uploaded sheet
pub async fn import_actions(
    State(db): State<Db>,
    Query(query): Query<ImportQuery>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let (filename, bytes) = read_upload(multipart).await?;
    let total = import::import_actions(&db, &query.id_pme, query.year, &filename, &bytes).await?;

    let msg = if total > 0 {
        "Importación exitosa"
    } else {
        "No se importaron datos"
    };
    Ok(Json(ImportResponse {
        msg: msg.to_string(),
        total,
    }))
}

/// GET /api/acciones/exportar/:id_pme - Export the actions of a plan as xlsx
pub async fn export_actions(
    State(db): State<Db>,
    Path(id_pme): Path<String>,
) -> Result<Response, AppError> {
    let actions = db.list_actions(&id_pme).await?;
    if actions.is_empty() {
        return Err(AppError::NotFound("No hay acciones".to_string()));
    }

    let (headers, rows) = export::action_export_table(&actions);
    let bytes = crate::spreadsheet::rows_to_xlsx("Acciones PME", &headers, &rows)?;

    let filename = format!("Acciones_PME_{}.xlsx", Utc::now().format("%Y%m%d_%H%M"));
    Ok(xlsx_response(&filename, bytes))
}

/// Pull the first file field out of a multipart upload
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Formulario inválido: {e}")))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("No se pudo leer el archivo: {e}")))?;

        if data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::Validation(format!(
                "Archivo demasiado grande: {} bytes",
                data.len()
            )));
        }

        return Ok((filename, data.to_vec()));
    }

    Err(AppError::Validation(
        "No se adjuntó ningún archivo".to_string(),
    ))
}
