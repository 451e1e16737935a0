//! Plan cloning
//!
//! Builds a copy of the previous year's plan contents (actions and each
//! action's resources) for a newly created plan. Every copied action gets a
//! fresh `uuid_accion` and row id, and its resources are re-keyed to point at
//! the copy, so the new plan is fully independent of the old one. The copy is
//! inserted together with the plan in one transaction by
//! [`Db::create_plan`](crate::db::Db::create_plan).

use crate::db::Db;
use crate::error::AppError;
use crate::models::{new_id, Action, Plan, Resource};
use tracing::info;
use uuid::Uuid;

/// Build a re-keyed copy of the prior-year plan of the same school
///
/// Returns the copied actions and resources, empty when the school has no
/// plan for `new_plan.year - 1`.
pub async fn previous_year_copy(
    db: &Db,
    new_plan: &Plan,
) -> Result<(Vec<Action>, Vec<Resource>), AppError> {
    let Some(old_plan) = db
        .find_plan_by_school_year(&new_plan.id_colegio, new_plan.year - 1)
        .await?
    else {
        info!(
            "No plan to clone for school {} year {}",
            new_plan.id_colegio,
            new_plan.year - 1
        );
        return Ok((Vec::new(), Vec::new()));
    };

    let mut actions = Vec::new();
    let mut resources = Vec::new();

    for old_action in db.list_actions(&old_plan.id).await? {
        let new_uuid = Uuid::new_v4().to_string();

        for old_resource in db.list_resources_by_action(&old_action.uuid_accion).await? {
            let mut resource = old_resource;
            resource.id = new_id();
            resource.id_pme = new_plan.id.clone();
            resource.uuid_accion = new_uuid.clone();
            resource.year = new_plan.year;
            resources.push(resource);
        }

        let mut action = old_action;
        action.id = new_id();
        action.uuid_accion = new_uuid;
        action.id_pme = new_plan.id.clone();
        action.year = new_plan.year;
        actions.push(action);
    }

    info!(
        "Prepared {} actions and {} resources from plan {} for plan {}",
        actions.len(),
        resources.len(),
        old_plan.id,
        new_plan.id
    );
    Ok((actions, resources))
}
