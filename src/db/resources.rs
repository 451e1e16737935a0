//! Resource (activity line item) queries

use super::Db;
use crate::error::AppError;
use crate::models::Resource;
use sqlx::types::Json;
use tracing::debug;

const RESOURCE_COLUMNS: &str = "id, id_pme, uuid_accion, dimension, subdimension, \
     nombre_actividad, descripcion_actividad, medios_ver, responsable, recursos_actividad, \
     monto, year, fecha";

/// Insert one resource row on any executor (pool or open transaction)
pub(super) async fn insert_resource<'e, E>(executor: E, resource: &Resource) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO recursos (id, id_pme, uuid_accion, dimension, subdimension, \
         nombre_actividad, descripcion_actividad, medios_ver, responsable, \
         recursos_actividad, monto, year, fecha) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&resource.id)
    .bind(&resource.id_pme)
    .bind(&resource.uuid_accion)
    .bind(&resource.dimension)
    .bind(&resource.subdimension)
    .bind(&resource.nombre_actividad)
    .bind(&resource.descripcion_actividad)
    .bind(&resource.medios_ver)
    .bind(&resource.responsable)
    .bind(Json(&resource.recursos_actividad))
    .bind(resource.monto)
    .bind(resource.year)
    .bind(resource.fecha)
    .execute(executor)
    .await?;

    Ok(())
}

impl Db {
    /// All resources of an action
    pub async fn list_resources_by_action(
        &self,
        uuid_accion: &str,
    ) -> Result<Vec<Resource>, AppError> {
        let resources = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM recursos WHERE uuid_accion = ? ORDER BY fecha ASC"
        ))
        .bind(uuid_accion)
        .fetch_all(self.pool())
        .await?;

        Ok(resources)
    }

    /// All resources of a plan, orphans included
    pub async fn list_resources_by_plan(&self, id_pme: &str) -> Result<Vec<Resource>, AppError> {
        let resources = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM recursos WHERE id_pme = ? ORDER BY fecha ASC"
        ))
        .bind(id_pme)
        .fetch_all(self.pool())
        .await?;

        Ok(resources)
    }

    /// Find a resource by row id
    pub async fn get_resource(&self, id: &str) -> Result<Option<Resource>, AppError> {
        let resource = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM recursos WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(resource)
    }

    /// Insert a new resource
    pub async fn create_resource(&self, resource: &Resource) -> Result<(), AppError> {
        insert_resource(self.pool(), resource).await?;

        debug!("Created resource {} (action {})", resource.id, resource.uuid_accion);
        Ok(())
    }

    /// Overwrite the mutable fields of a resource, keyed by row id
    pub async fn replace_resource(&self, resource: &Resource) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE recursos SET id_pme = ?, uuid_accion = ?, dimension = ?, subdimension = ?, \
             nombre_actividad = ?, descripcion_actividad = ?, medios_ver = ?, responsable = ?, \
             recursos_actividad = ?, monto = ?, year = ? \
             WHERE id = ?",
        )
        .bind(&resource.id_pme)
        .bind(&resource.uuid_accion)
        .bind(&resource.dimension)
        .bind(&resource.subdimension)
        .bind(&resource.nombre_actividad)
        .bind(&resource.descripcion_actividad)
        .bind(&resource.medios_ver)
        .bind(&resource.responsable)
        .bind(Json(&resource.recursos_actividad))
        .bind(resource.monto)
        .bind(resource.year)
        .bind(&resource.id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a resource by row id; returns false when it does not exist
    pub async fn delete_resource(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM recursos WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
