//! School (colegio) queries

use super::Db;
use crate::error::AppError;
use crate::models::School;
use tracing::debug;

impl Db {
    /// Get all schools
    pub async fn list_schools(&self) -> Result<Vec<School>, AppError> {
        let schools = sqlx::query_as::<_, School>(
            "SELECT id, nombre, rbd, rut, direccion, telefono, director, imagen \
             FROM colegios ORDER BY nombre ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(schools)
    }

    /// Check whether a school with the given name already exists
    pub async fn school_name_exists(&self, nombre: &str) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM colegios WHERE nombre = ?")
            .bind(nombre)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.is_some())
    }

    /// Insert a new school
    pub async fn create_school(&self, school: &School) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO colegios (id, nombre, rbd, rut, direccion, telefono, director, imagen) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&school.id)
        .bind(&school.nombre)
        .bind(&school.rbd)
        .bind(&school.rut)
        .bind(&school.direccion)
        .bind(&school.telefono)
        .bind(&school.director)
        .bind(&school.imagen)
        .execute(self.pool())
        .await?;

        debug!("Created school: {} ({})", school.nombre, school.id);
        Ok(())
    }
}
