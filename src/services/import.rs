//! Spreadsheet import
//!
//! Maps normalized spreadsheet records onto actions and resources and inserts
//! them under a forced plan/year. Rows that cannot be mapped are skipped, not
//! fatal, matching the original per-row behavior.

use crate::db::Db;
use crate::error::AppError;
use crate::models::{new_id, Action, Resource, UNASSIGNED_ACTION};
use crate::spreadsheet::parser::RawRecord;
use crate::spreadsheet::parse_upload;
use chrono::Utc;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a resource import
#[derive(Debug, Clone, Copy)]
pub struct ResourceImportOutcome {
    /// Rows inserted
    pub total: usize,
    /// Rows inserted without a parent action (`uuid_accion` = "sin asignar")
    pub huerfanos: usize,
}

/// Alternate column names accepted on resource sheets
static RESOURCE_COLUMN_ALIASES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HashMap::from([("insumos", "recursos_actividad")]));

/// Look up a field, trying resource aliases for the canonical name
fn field<'a>(record: &'a RawRecord, name: &str) -> Option<&'a str> {
    if let Some(value) = record.get(name) {
        return Some(value.as_str());
    }
    RESOURCE_COLUMN_ALIASES
        .iter()
        .find(|(_, canonical)| **canonical == name)
        .and_then(|(alias, _)| record.get(*alias))
        .map(String::as_str)
}

fn non_empty(record: &RawRecord, name: &str) -> Option<String> {
    field(record, name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Split a comma-separated cell into trimmed items
fn split_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(v) if !v.trim().is_empty() => v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse an amount cell; empty means 0, unparseable means the row is invalid
///
/// Excel number cells surface as "1500" or "1500.5" depending on formatting.
fn parse_amount(value: Option<&str>) -> Option<i64> {
    let v = value.unwrap_or("").trim();
    if v.is_empty() {
        return Some(0);
    }
    if let Ok(n) = v.parse::<i64>() {
        return Some(n);
    }
    v.parse::<f64>().ok().map(|f| f as i64)
}

/// Map one sheet row onto an action; `None` when required fields are missing
pub fn map_action_row(record: &RawRecord, id_pme: &str, year: i64) -> Option<Action> {
    let nombre_accion = non_empty(record, "nombre_accion")?;
    let descripcion = non_empty(record, "descripcion")?;
    let dimension = non_empty(record, "dimension")?;

    Some(Action {
        id: new_id(),
        uuid_accion: Uuid::new_v4().to_string(),
        id_pme: id_pme.to_string(),
        year,
        nombre_accion,
        descripcion,
        dimension,
        subdimensiones: split_list(field(record, "subdimensiones")),
        objetivo_estrategico: non_empty(record, "objetivo_estrategico"),
        estrategia: non_empty(record, "estrategia"),
        planes: non_empty(record, "planes"),
        responsable: non_empty(record, "responsable"),
        recursos_necesarios_ejecucion: non_empty(record, "recursos_necesarios_ejecucion"),
        medios_verificacion: non_empty(record, "medios_verificacion"),
        monto_sep: parse_amount(field(record, "monto_sep"))?,
        monto_total: parse_amount(field(record, "monto_total"))?,
        fecha_actualizacion: Utc::now(),
    })
}

/// Map one sheet row onto a resource; `None` when the amount cell is garbage
///
/// A missing or "nan" `uuid_accion` cell produces an orphan row.
pub fn map_resource_row(record: &RawRecord, id_pme: &str, year: i64) -> Option<Resource> {
    let uuid_accion = match non_empty(record, "uuid_accion") {
        Some(v) if v.to_lowercase() != "nan" => v,
        _ => UNASSIGNED_ACTION.to_string(),
    };

    Some(Resource {
        id: new_id(),
        id_pme: id_pme.to_string(),
        uuid_accion,
        dimension: non_empty(record, "dimension"),
        subdimension: non_empty(record, "subdimension"),
        nombre_actividad: non_empty(record, "nombre_actividad"),
        descripcion_actividad: non_empty(record, "descripcion_actividad"),
        medios_ver: non_empty(record, "medios_ver"),
        responsable: non_empty(record, "responsable"),
        recursos_actividad: split_list(field(record, "recursos_actividad")),
        monto: parse_amount(field(record, "monto"))?,
        year,
        fecha: Utc::now(),
    })
}

/// Parse an uploaded sheet and insert its rows as actions of `id_pme`
pub async fn import_actions(
    db: &Db,
    id_pme: &str,
    year: i64,
    filename: &str,
    bytes: &[u8],
) -> Result<usize, AppError> {
    if !db.plan_exists(id_pme).await? {
        return Err(AppError::NotFound(format!("PME {id_pme}")));
    }

    let records = parse_upload(filename, bytes)?;
    let mut total = 0;

    for record in &records {
        match map_action_row(record, id_pme, year) {
            Some(action) => {
                db.create_action(&action).await?;
                total += 1;
            }
            None => warn!("Skipping invalid action row: {:?}", record.keys()),
        }
    }

    info!(
        "Imported {}/{} actions into plan {} from {}",
        total,
        records.len(),
        id_pme,
        filename
    );
    Ok(total)
}

/// Parse an uploaded sheet and insert its rows as resources of `id_pme`
pub async fn import_resources(
    db: &Db,
    id_pme: &str,
    year: i64,
    filename: &str,
    bytes: &[u8],
) -> Result<ResourceImportOutcome, AppError> {
    if !db.plan_exists(id_pme).await? {
        return Err(AppError::NotFound(format!("PME {id_pme}")));
    }

    let records = parse_upload(filename, bytes)?;
    let mut outcome = ResourceImportOutcome {
        total: 0,
        huerfanos: 0,
    };

    for record in &records {
        match map_resource_row(record, id_pme, year) {
            Some(resource) => {
                if resource.uuid_accion == UNASSIGNED_ACTION {
                    outcome.huerfanos += 1;
                }
                db.create_resource(&resource).await?;
                outcome.total += 1;
            }
            None => warn!("Skipping invalid resource row: {:?}", record.keys()),
        }
    }

    info!(
        "Imported {} resources ({} orphans) into plan {} from {}",
        outcome.total, outcome.huerfanos, id_pme, filename
    );
    Ok(outcome)
}
