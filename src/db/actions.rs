//! Action queries, including the cascade delete
//!
//! Actions are addressed by their `uuid_accion` business key on the API
//! surface; the row id stays internal.

use super::Db;
use crate::error::AppError;
use crate::models::Action;
use sqlx::types::Json;
use tracing::debug;

const ACTION_COLUMNS: &str = "id, uuid_accion, id_pme, year, nombre_accion, descripcion, \
     dimension, subdimensiones, objetivo_estrategico, estrategia, planes, responsable, \
     recursos_necesarios_ejecucion, medios_verificacion, monto_sep, monto_total, \
     fecha_actualizacion";

/// Insert one action row on any executor (pool or open transaction)
pub(super) async fn insert_action<'e, E>(executor: E, action: &Action) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO acciones (id, uuid_accion, id_pme, year, nombre_accion, descripcion, \
         dimension, subdimensiones, objetivo_estrategico, estrategia, planes, responsable, \
         recursos_necesarios_ejecucion, medios_verificacion, monto_sep, monto_total, \
         fecha_actualizacion) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&action.id)
    .bind(&action.uuid_accion)
    .bind(&action.id_pme)
    .bind(action.year)
    .bind(&action.nombre_accion)
    .bind(&action.descripcion)
    .bind(&action.dimension)
    .bind(Json(&action.subdimensiones))
    .bind(&action.objetivo_estrategico)
    .bind(&action.estrategia)
    .bind(&action.planes)
    .bind(&action.responsable)
    .bind(&action.recursos_necesarios_ejecucion)
    .bind(&action.medios_verificacion)
    .bind(action.monto_sep)
    .bind(action.monto_total)
    .bind(action.fecha_actualizacion)
    .execute(executor)
    .await?;

    Ok(())
}

impl Db {
    /// All actions of a plan
    pub async fn list_actions(&self, id_pme: &str) -> Result<Vec<Action>, AppError> {
        let actions = sqlx::query_as::<_, Action>(&format!(
            "SELECT {ACTION_COLUMNS} FROM acciones WHERE id_pme = ? ORDER BY fecha_actualizacion ASC"
        ))
        .bind(id_pme)
        .fetch_all(self.pool())
        .await?;

        Ok(actions)
    }

    /// Find an action by its business key
    pub async fn get_action_by_uuid(&self, uuid_accion: &str) -> Result<Option<Action>, AppError> {
        let action = sqlx::query_as::<_, Action>(&format!(
            "SELECT {ACTION_COLUMNS} FROM acciones WHERE uuid_accion = ?"
        ))
        .bind(uuid_accion)
        .fetch_optional(self.pool())
        .await?;

        Ok(action)
    }

    /// Insert a new action
    pub async fn create_action(&self, action: &Action) -> Result<(), AppError> {
        insert_action(self.pool(), action).await?;

        debug!("Created action {} in plan {}", action.uuid_accion, action.id_pme);
        Ok(())
    }

    /// Overwrite the mutable fields of an action, keyed by `uuid_accion`
    ///
    /// The business key, row id and owning plan are immutable; callers fetch
    /// the current row, apply the patch and pass the merged record here.
    pub async fn replace_action(&self, action: &Action) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE acciones SET year = ?, nombre_accion = ?, descripcion = ?, dimension = ?, \
             subdimensiones = ?, objetivo_estrategico = ?, estrategia = ?, planes = ?, \
             responsable = ?, recursos_necesarios_ejecucion = ?, medios_verificacion = ?, \
             monto_sep = ?, monto_total = ?, fecha_actualizacion = ? \
             WHERE uuid_accion = ?",
        )
        .bind(action.year)
        .bind(&action.nombre_accion)
        .bind(&action.descripcion)
        .bind(&action.dimension)
        .bind(Json(&action.subdimensiones))
        .bind(&action.objetivo_estrategico)
        .bind(&action.estrategia)
        .bind(&action.planes)
        .bind(&action.responsable)
        .bind(&action.recursos_necesarios_ejecucion)
        .bind(&action.medios_verificacion)
        .bind(action.monto_sep)
        .bind(action.monto_total)
        .bind(action.fecha_actualizacion)
        .bind(&action.uuid_accion)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an action and every resource pointing at it
    ///
    /// Returns false when the action does not exist.
    pub async fn delete_action_cascade(&self, uuid_accion: &str) -> Result<bool, AppError> {
        let mut tx = self.pool().begin().await?;

        let deleted = sqlx::query("DELETE FROM acciones WHERE uuid_accion = ?")
            .bind(uuid_accion)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let resources = sqlx::query("DELETE FROM recursos WHERE uuid_accion = ?")
            .bind(uuid_accion)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            "Deleted action {} ({} resources)",
            uuid_accion,
            resources.rows_affected()
        );
        Ok(true)
    }
}
