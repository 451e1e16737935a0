//! Plan (PME) queries, including the cascade delete

use super::actions::insert_action;
use super::resources::insert_resource;
use super::Db;
use crate::error::AppError;
use crate::models::{Action, Plan, Resource};
use tracing::debug;

impl Db {
    /// Find the plan of a school for a given year, if any
    pub async fn find_plan_by_school_year(
        &self,
        id_colegio: &str,
        year: i64,
    ) -> Result<Option<Plan>, AppError> {
        let plan = sqlx::query_as::<_, Plan>(
            "SELECT id, year, id_colegio, director, observacion FROM pme \
             WHERE id_colegio = ? AND year = ?",
        )
        .bind(id_colegio)
        .bind(year)
        .fetch_optional(self.pool())
        .await?;

        Ok(plan)
    }

    /// Check whether a plan exists by id
    pub async fn plan_exists(&self, id: &str) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM pme WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.is_some())
    }

    /// All plans of a school, newest year first
    pub async fn list_plans_by_school(&self, id_colegio: &str) -> Result<Vec<Plan>, AppError> {
        let plans = sqlx::query_as::<_, Plan>(
            "SELECT id, year, id_colegio, director, observacion FROM pme \
             WHERE id_colegio = ? ORDER BY year DESC",
        )
        .bind(id_colegio)
        .fetch_all(self.pool())
        .await?;

        Ok(plans)
    }

    /// Insert a new plan together with any cloned contents, atomically
    ///
    /// `actions` and `resources` are empty unless the plan was created with
    /// cloning. A failure on any row rolls the whole insert back, so a plan
    /// never appears with a partial copy.
    pub async fn create_plan(
        &self,
        plan: &Plan,
        actions: &[Action],
        resources: &[Resource],
    ) -> Result<(), AppError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "INSERT INTO pme (id, year, id_colegio, director, observacion) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&plan.id)
        .bind(plan.year)
        .bind(&plan.id_colegio)
        .bind(&plan.director)
        .bind(&plan.observacion)
        .execute(&mut *tx)
        .await?;

        for action in actions {
            insert_action(&mut *tx, action).await?;
        }
        for resource in resources {
            insert_resource(&mut *tx, resource).await?;
        }

        tx.commit().await?;

        debug!(
            "Created plan {} (year {}, {} cloned actions, {} cloned resources)",
            plan.id,
            plan.year,
            actions.len(),
            resources.len()
        );
        Ok(())
    }

    /// Update the mutable fields of a plan; returns false when it does not exist
    pub async fn update_plan(
        &self,
        id: &str,
        director: &str,
        observacion: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE pme SET director = ?, observacion = ? WHERE id = ?")
            .bind(director)
            .bind(observacion)
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a plan and every dependent action and resource
    ///
    /// Dependents are matched by `id_pme`, which also removes orphan resources
    /// imported against the plan. Returns false when the plan does not exist.
    pub async fn delete_plan_cascade(&self, id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool().begin().await?;

        let deleted = sqlx::query("DELETE FROM pme WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let actions = sqlx::query("DELETE FROM acciones WHERE id_pme = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let resources = sqlx::query("DELETE FROM recursos WHERE id_pme = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            "Deleted plan {} ({} actions, {} resources)",
            id,
            actions.rows_affected(),
            resources.rows_affected()
        );
        Ok(true)
    }
}
