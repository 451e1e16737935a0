//! Spreadsheet export
//!
//! Flattens nested records into tabular rows for the xlsx downloads: actions
//! one row each, and resources joined with their parent action. Column
//! selection and the display renames of the per-action report live here so
//! the handlers stay thin.

use crate::models::{Action, Resource};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Column order of the plan-wide resource report
pub const PLAN_RESOURCE_COLUMNS: &[&str] = &[
    "nombre_actividad",
    "descripcion_actividad",
    "responsable",
    "medios_ver",
    "recursos_actividad",
    "monto",
    "year",
    "uuid_accion",
    "nombre_accion",
    "descripcion_accion",
    "dimension",
];

/// Column order of the single-action report (no dimension column)
pub const ACTION_RESOURCE_COLUMNS: &[&str] = &[
    "nombre_actividad",
    "descripcion_actividad",
    "responsable",
    "medios_ver",
    "recursos_actividad",
    "monto",
    "year",
    "uuid_accion",
    "nombre_accion",
    "descripcion_accion",
];

/// Display names applied to the single-action report headers
static PRETTY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("nombre_actividad", "Actividad"),
        ("descripcion_actividad", "Desc. Actividad"),
        ("recursos_actividad", "Insumos"),
        ("nombre_accion", "Acción"),
        ("descripcion_accion", "Desc. Acción"),
        ("uuid_accion", "UUID Acción"),
    ])
});

/// A flattened export row keyed by column name
pub type ExportRow = HashMap<String, Value>;

fn opt(value: &Option<String>) -> Value {
    json!(value.clone().unwrap_or_default())
}

/// One export row per action of a plan, list fields joined with ", "
pub fn action_export_table(actions: &[Action]) -> (Vec<String>, Vec<Vec<Value>>) {
    let headers: Vec<String> = [
        "uuid_accion",
        "id_pme",
        "year",
        "nombre_accion",
        "descripcion",
        "dimension",
        "subdimensiones",
        "objetivo_estrategico",
        "estrategia",
        "planes",
        "responsable",
        "recursos_necesarios_ejecucion",
        "medios_verificacion",
        "monto_sep",
        "monto_total",
        "fecha_actualizacion",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let rows = actions
        .iter()
        .map(|a| {
            vec![
                json!(a.uuid_accion),
                json!(a.id_pme),
                json!(a.year),
                json!(a.nombre_accion),
                json!(a.descripcion),
                json!(a.dimension),
                json!(a.subdimensiones.join(", ")),
                opt(&a.objetivo_estrategico),
                opt(&a.estrategia),
                opt(&a.planes),
                opt(&a.responsable),
                opt(&a.recursos_necesarios_ejecucion),
                opt(&a.medios_verificacion),
                json!(a.monto_sep),
                json!(a.monto_total),
                json!(a.fecha_actualizacion.to_rfc3339()),
            ]
        })
        .collect();

    (headers, rows)
}

fn base_resource_row(resource: &Resource) -> ExportRow {
    let mut row = ExportRow::new();
    row.insert("nombre_actividad".into(), opt(&resource.nombre_actividad));
    row.insert(
        "descripcion_actividad".into(),
        opt(&resource.descripcion_actividad),
    );
    row.insert("responsable".into(), opt(&resource.responsable));
    row.insert("medios_ver".into(), opt(&resource.medios_ver));
    row.insert(
        "recursos_actividad".into(),
        json!(resource.recursos_actividad.join(", ")),
    );
    row.insert("monto".into(), json!(resource.monto));
    row.insert("year".into(), json!(resource.year));
    row
}

/// Flatten the resources of a whole plan, joined with their parent action
///
/// Resources whose action is missing (orphans) get "Huérfano" as the parent
/// name and empty action fields.
pub fn flatten_plan_resources(
    resources: &[Resource],
    actions_by_uuid: &HashMap<String, Action>,
) -> Vec<ExportRow> {
    resources
        .iter()
        .map(|resource| {
            let parent = actions_by_uuid.get(&resource.uuid_accion);
            let mut row = base_resource_row(resource);
            row.insert("uuid_accion".into(), json!(resource.uuid_accion));
            row.insert(
                "nombre_accion".into(),
                json!(parent.map_or("Huérfano", |a| a.nombre_accion.as_str())),
            );
            row.insert(
                "descripcion_accion".into(),
                json!(parent.map_or("", |a| a.descripcion.as_str())),
            );
            row.insert(
                "dimension".into(),
                json!(parent.map_or("", |a| a.dimension.as_str())),
            );
            row
        })
        .collect()
}

/// Flatten the resources of a single action; the parent fields repeat on
/// every row of the report
pub fn flatten_action_resources(
    resources: &[Resource],
    uuid_accion: &str,
    action: Option<&Action>,
) -> Vec<ExportRow> {
    let nombre_accion = action.map_or("Desconocida", |a| a.nombre_accion.as_str());
    let descripcion_accion = action.map_or("Sin descripción", |a| a.descripcion.as_str());

    resources
        .iter()
        .map(|resource| {
            let mut row = base_resource_row(resource);
            row.insert("uuid_accion".into(), json!(uuid_accion));
            row.insert("nombre_accion".into(), json!(nombre_accion));
            row.insert("descripcion_accion".into(), json!(descripcion_accion));
            row
        })
        .collect()
}

/// Keep only the requested columns, in request order
///
/// Requested names not present in `available` are dropped; when nothing
/// survives, the full default order is used.
pub fn select_columns(
    requested: &[String],
    available: &[&str],
    rows: &[ExportRow],
) -> (Vec<String>, Vec<Vec<Value>>) {
    let mut headers: Vec<String> = requested
        .iter()
        .filter(|c| available.contains(&c.as_str()))
        .cloned()
        .collect();

    if headers.is_empty() {
        headers = available.iter().map(|s| s.to_string()).collect();
    }

    let data = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    (headers, data)
}

/// Replace canonical column names with display names where one is defined
pub fn prettify_headers(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| {
            PRETTY_NAMES
                .get(h.as_str())
                .map_or_else(|| h.clone(), |pretty| pretty.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_action(uuid: &str, nombre: &str) -> Action {
        Action {
            id: Uuid::new_v4().to_string(),
            uuid_accion: uuid.to_string(),
            id_pme: "pme-1".to_string(),
            year: 2025,
            nombre_accion: nombre.to_string(),
            descripcion: "desc".to_string(),
            dimension: "Liderazgo".to_string(),
            subdimensiones: vec!["a".to_string(), "b".to_string()],
            objetivo_estrategico: None,
            estrategia: None,
            planes: None,
            responsable: None,
            recursos_necesarios_ejecucion: None,
            medios_verificacion: None,
            monto_sep: 100,
            monto_total: 200,
            fecha_actualizacion: Utc::now(),
        }
    }

    fn sample_resource(uuid_accion: &str) -> Resource {
        Resource {
            id: Uuid::new_v4().to_string(),
            id_pme: "pme-1".to_string(),
            uuid_accion: uuid_accion.to_string(),
            dimension: None,
            subdimension: None,
            nombre_actividad: Some("Actividad".to_string()),
            descripcion_actividad: None,
            medios_ver: None,
            responsable: None,
            recursos_actividad: vec!["libros".to_string(), "papel".to_string()],
            monto: 500,
            year: 2025,
            fecha: Utc::now(),
        }
    }

    #[test]
    fn test_action_export_joins_subdimensions() {
        let (headers, rows) = action_export_table(&[sample_action("u1", "Taller")]);
        let idx = headers.iter().position(|h| h == "subdimensiones").unwrap();
        assert_eq!(rows[0][idx], json!("a, b"));
    }

    #[test]
    fn test_flatten_marks_orphans() {
        let actions: HashMap<String, Action> =
            [("u1".to_string(), sample_action("u1", "Taller"))].into();
        let resources = vec![sample_resource("u1"), sample_resource("perdido")];

        let rows = flatten_plan_resources(&resources, &actions);
        assert_eq!(rows[0]["nombre_accion"], json!("Taller"));
        assert_eq!(rows[1]["nombre_accion"], json!("Huérfano"));
        assert_eq!(rows[0]["recursos_actividad"], json!("libros, papel"));
    }

    #[test]
    fn test_flatten_action_uses_fallback_parent() {
        let rows = flatten_action_resources(&[sample_resource("u9")], "u9", None);
        assert_eq!(rows[0]["nombre_accion"], json!("Desconocida"));
        assert_eq!(rows[0]["descripcion_accion"], json!("Sin descripción"));
    }

    #[test]
    fn test_select_columns_keeps_request_order() {
        let rows = flatten_action_resources(&[sample_resource("u1")], "u1", None);
        let requested = vec![
            "monto".to_string(),
            "no_existe".to_string(),
            "nombre_actividad".to_string(),
        ];

        let (headers, data) = select_columns(&requested, ACTION_RESOURCE_COLUMNS, &rows);
        assert_eq!(headers, vec!["monto", "nombre_actividad"]);
        assert_eq!(data[0][0], json!(500));
        assert_eq!(data[0][1], json!("Actividad"));
    }

    #[test]
    fn test_select_columns_falls_back_to_all() {
        let rows = flatten_action_resources(&[sample_resource("u1")], "u1", None);
        let (headers, _) = select_columns(&["zzz".to_string()], ACTION_RESOURCE_COLUMNS, &rows);
        assert_eq!(headers.len(), ACTION_RESOURCE_COLUMNS.len());
    }

    #[test]
    fn test_prettify_headers() {
        let headers = vec!["nombre_actividad".to_string(), "monto".to_string()];
        assert_eq!(prettify_headers(&headers), vec!["Actividad", "monto"]);
    }
}
