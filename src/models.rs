//! Domain models
//!
//! Flat records related by string-valued foreign keys, mirroring the
//! collections of the original document store. Field names are kept in
//! Spanish because the frontend consumes them verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sentinel `uuid_accion` for resources imported without a parent action.
pub const UNASSIGNED_ACTION: &str = "sin asignar";

/// A school (colegio)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    /// Unique identifier
    pub id: String,
    /// School name (unique)
    pub nombre: String,
    /// Official school registry code
    pub rbd: String,
    /// Tax identifier
    pub rut: String,
    /// Street address
    pub direccion: Option<String>,
    /// Contact phone
    pub telefono: Option<String>,
    /// Principal name
    pub director: Option<String>,
    /// Logo / photo URL
    pub imagen: Option<String>,
}

/// A yearly improvement plan (PME) for one school
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plan {
    /// Unique identifier
    pub id: String,
    /// Plan year; at most one plan per (school, year)
    pub year: i64,
    /// Owning school id
    pub id_colegio: String,
    /// Plan director
    pub director: String,
    /// Free-form observation
    pub observacion: String,
}

impl Plan {
    /// Create a new plan with a generated id.
    pub fn new(year: i64, id_colegio: String, director: String, observacion: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            year,
            id_colegio,
            director,
            observacion,
        }
    }
}

/// An action item inside a plan
///
/// `uuid_accion` is the stable business key resources point at; the row `id`
/// is internal. Cloning a plan generates fresh values for both.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Action {
    /// Row identifier
    pub id: String,
    /// Stable business key (unique); resources reference this
    pub uuid_accion: String,
    /// Owning plan id
    pub id_pme: String,
    /// Plan year, denormalized for export
    pub year: i64,
    /// Action name
    pub nombre_accion: String,
    /// Action description
    pub descripcion: String,
    /// Quality dimension (e.g. "Gestión Pedagógica")
    pub dimension: String,
    /// Sub-dimensions, stored as a JSON array column
    #[sqlx(json)]
    pub subdimensiones: Vec<String>,
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
    pub monto_sep: i64,
    /// Total amount
    pub monto_total: i64,
    /// Last modification time
    pub fecha_actualizacion: DateTime<Utc>,
}

/// A resource / activity line item attached to an action
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resource {
    /// Row identifier
    pub id: String,
    /// Owning plan id
    pub id_pme: String,
    /// Parent action business key, or [`UNASSIGNED_ACTION`] for orphans
    pub uuid_accion: String,
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
    /// Supplies list, stored as a JSON array column
    #[sqlx(json)]
    pub recursos_actividad: Vec<String>,
    /// Amount
    pub monto: i64,
    /// Plan year
    pub year: i64,
    /// Creation time
    pub fecha: DateTime<Utc>,
}

/// A login profile (plaintext credentials, per the original service)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Profile name, primary key
    pub perfil: String,
    /// Plaintext password
    pub contrasena: String,
}

/// Generate a fresh record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_new_generates_distinct_ids() {
        let a = Plan::new(2025, "c1".into(), "dir".into(), "obs".into());
        let b = Plan::new(2025, "c1".into(), "dir".into(), "obs".into());
        assert_ne!(a.id, b.id);
        assert_eq!(a.year, 2025);
    }

    #[test]
    fn test_new_id_is_uuid_shaped() {
        let id = new_id();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }
}
