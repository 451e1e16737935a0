//! Resource API handlers
//!
//! CRUD by row id, listings by action and by plan, the resource import, and
//! the two column-selectable xlsx reports.

use super::{xlsx_response, MessageResponse};
use crate::db::Db;
use crate::error::AppError;
use crate::models::{new_id, Resource};
use crate::services::{export, import};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::actions::{read_upload, ImportQuery};

/// Create resource request
#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    /// Owning plan id
    pub id_pme: String,
    /// Parent action business key
    pub uuid_accion: String,
    /// Quality dimension
    #[serde(default)]
    pub dimension: Option<String>,
    /// Sub-dimension
    #[serde(default)]
    pub subdimension: Option<String>,
    /// Activity name
    #[serde(default)]
    pub nombre_actividad: Option<String>,
    /// Activity description
    #[serde(default)]
    pub descripcion_actividad: Option<String>,
    /// Verification evidence
    #[serde(default)]
    pub medios_ver: Option<String>,
    /// Responsible person
    #[serde(default)]
    pub responsable: Option<String>,
    /// Supplies list
    #[serde(default)]
    pub recursos_actividad: Vec<String>,
    /// Amount
    #[serde(default)]
    pub monto: i64,
    /// Plan year
    pub year: i64,
}

/// Update resource request; absent fields keep their current value
#[derive(Debug, Deserialize, Default)]
pub struct UpdateResourceRequest {
    /// Owning plan id
    pub id_pme: Option<String>,
    /// Parent action business key
    pub uuid_accion: Option<String>,
    /// Quality dimension
    pub dimension: Option<String>,
    /// Sub-dimension
    pub subdimension: Option<String>,
    /// Activity name
    pub nombre_actividad: Option<String>,
    /// Activity description
    pub descripcion_actividad: Option<String>,
    /// Verification evidence
    pub medios_ver: Option<String>,
    /// Responsible person
    pub responsable: Option<String>,
    /// Supplies list
    pub recursos_actividad: Option<Vec<String>>,
    /// Amount
    pub monto: Option<i64>,
    /// Plan year
    pub year: Option<i64>,
}

/// Create resource response
#[derive(Debug, Serialize)]
pub struct ResourceCreatedResponse {
    /// Human-readable outcome message
    pub msg: String,
    /// Generated resource id
    pub id: String,
}

/// Resource import response
#[derive(Debug, Serialize)]
pub struct ResourceImportResponse {
    /// Human-readable outcome message
    pub msg: String,
    /// Rows inserted
    pub total: usize,
    /// Rows inserted without a parent action; the frontend reads the
    /// accented key
    #[serde(rename = "huérfanos")]
    pub huerfanos: usize,
}

/// Column selection payload of the custom exports
#[derive(Debug, Deserialize)]
pub struct ExportColumnsRequest {
    /// Columns to keep, in order; unknown names are ignored
    #[serde(default)]
    pub columnas: Vec<String>,
}

/// GET /api/recursos/:uuid_accion - List the resources of an action
pub async fn list_by_action(
    State(db): State<Db>,
    Path(uuid_accion): Path<String>,
) -> Result<Json<Vec<Resource>>, AppError> {
    let resources = db.list_resources_by_action(&uuid_accion).await?;
    Ok(Json(resources))
}

/// GET /api/recursos/pme/:id_pme - List every resource of a plan
pub async fn list_by_plan(
    State(db): State<Db>,
    Path(id_pme): Path<String>,
) -> Result<Json<Vec<Resource>>, AppError> {
    let resources = db.list_resources_by_plan(&id_pme).await?;
    Ok(Json(resources))
}

/// POST /api/recursos - Create a new resource
pub async fn create_resource(
    State(db): State<Db>,
    Json(request): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceCreatedResponse>), AppError> {
    let resource = Resource {
        id: new_id(),
        id_pme: request.id_pme,
        uuid_accion: request.uuid_accion,
        dimension: request.dimension,
        subdimension: request.subdimension,
        nombre_actividad: request.nombre_actividad,
        descripcion_actividad: request.descripcion_actividad,
        medios_ver: request.medios_ver,
        responsable: request.responsable,
        recursos_actividad: request.recursos_actividad,
        monto: request.monto,
        year: request.year,
        fecha: Utc::now(),
    };
    db.create_resource(&resource).await?;

    Ok((
        StatusCode::CREATED,
        Json(ResourceCreatedResponse {
            msg: "Recurso creado".to_string(),
            id: resource.id,
        }),
    ))
}

/// PUT /api/recursos/:id_recurso - Update a resource by row id
pub async fn update_resource(
    State(db): State<Db>,
    Path(id_recurso): Path<String>,
    Json(request): Json<UpdateResourceRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut resource = db
        .get_resource(&id_recurso)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("recurso {id_recurso}")))?;

    if let Some(id_pme) = request.id_pme {
        resource.id_pme = id_pme;
    }
    if let Some(uuid_accion) = request.uuid_accion {
        resource.uuid_accion = uuid_accion;
    }
    if let Some(dimension) = request.dimension {
        resource.dimension = Some(dimension);
    }
    if let Some(subdimension) = request.subdimension {
        resource.subdimension = Some(subdimension);
    }
    if let Some(nombre_actividad) = request.nombre_actividad {
        resource.nombre_actividad = Some(nombre_actividad);
    }
    if let Some(descripcion_actividad) = request.descripcion_actividad {
        resource.descripcion_actividad = Some(descripcion_actividad);
    }
    if let Some(medios_ver) = request.medios_ver {
        resource.medios_ver = Some(medios_ver);
    }
    if let Some(responsable) = request.responsable {
        resource.responsable = Some(responsable);
    }
    if let Some(recursos_actividad) = request.recursos_actividad {
        resource.recursos_actividad = recursos_actividad;
    }
    if let Some(monto) = request.monto {
        resource.monto = monto;
    }
    if let Some(year) = request.year {
        resource.year = year;
    }

    db.replace_resource(&resource).await?;
    Ok(Json(MessageResponse::new("Recurso actualizado")))
}

/// DELETE /api/recursos/:id_recurso - Delete a resource by row id
pub async fn delete_resource(
    State(db): State<Db>,
    Path(id_recurso): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = db.delete_resource(&id_recurso).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("recurso {id_recurso}")));
    }

    Ok(Json(MessageResponse::new("Recurso eliminado")))
}

/// POST /api/recursos/importar_excel - Import resources from an uploaded sheet
pub async fn import_resources(
    State(db): State<Db>,
    Query(query): Query<ImportQuery>,
    multipart: Multipart,
) -> Result<Json<ResourceImportResponse>, AppError> {
    let (filename, bytes) = read_upload(multipart).await?;
    let outcome =
        import::import_resources(&db, &query.id_pme, query.year, &filename, &bytes).await?;

    let msg = if outcome.total > 0 {
        "Importación exitosa"
    } else {
        "No se importaron datos"
    };
    Ok(Json(ResourceImportResponse {
        msg: msg.to_string(),
        total: outcome.total,
        huerfanos: outcome.huerfanos,
    }))
}

/// POST /api/recursos/exportar_custom/:id_pme - Plan-wide resource report
///
/// Every resource of the plan is joined with its parent action and the
/// requested columns are exported as xlsx.
pub async fn export_plan_resources(
    State(db): State<Db>,
    Path(id_pme): Path<String>,
    Json(request): Json<ExportColumnsRequest>,
) -> Result<Response, AppError> {
    let resources = db.list_resources_by_plan(&id_pme).await?;
    if resources.is_empty() {
        return Err(AppError::NotFound("No hay recursos".to_string()));
    }

    let actions_by_uuid: HashMap<_, _> = db
        .list_actions(&id_pme)
        .await?
        .into_iter()
        .map(|a| (a.uuid_accion.clone(), a))
        .collect();

    let rows = export::flatten_plan_resources(&resources, &actions_by_uuid);
    let (headers, data) =
        export::select_columns(&request.columnas, export::PLAN_RESOURCE_COLUMNS, &rows);
    let bytes = crate::spreadsheet::rows_to_xlsx("Recursos PME", &headers, &data)?;

    let filename = format!(
        "Reporte_Actividades_{}.xlsx",
        Utc::now().format("%Y%m%d_%H%M")
    );
    Ok(xlsx_response(&filename, bytes))
}

/// POST /api/recursos/exportar_custom_accion/:uuid_accion - Single-action report
pub async fn export_action_resources(
    State(db): State<Db>,
    Path(uuid_accion): Path<String>,
    Json(request): Json<ExportColumnsRequest>,
) -> Result<Response, AppError> {
    let resources = db.list_resources_by_action(&uuid_accion).await?;
    if resources.is_empty() {
        return Err(AppError::NotFound(
            "Esta acción no tiene recursos asociados".to_string(),
        ));
    }

    let action = db.get_action_by_uuid(&uuid_accion).await?;
    let rows = export::flatten_action_resources(&resources, &uuid_accion, action.as_ref());
    let (headers, data) =
        export::select_columns(&request.columnas, export::ACTION_RESOURCE_COLUMNS, &rows);
    let pretty = export::prettify_headers(&headers);
    let bytes = crate::spreadsheet::rows_to_xlsx("Detalle Acción", &pretty, &data)?;

    let short_uuid: String = uuid_accion.chars().take(8).collect();
    let filename = format!("Detalle_Accion_{short_uuid}.xlsx");
    Ok(xlsx_response(&filename, bytes))
}
