//! Integration tests for plan cloning and cascade deletion
//!
//! These are the referential-integrity paths: copying a year's plan into the
//! next year with re-keyed identifiers, and removing dependents when a plan
//! or action is deleted.

use axum::extract::{Path, State};
use axum::Json;
use pme_backend::api::actions::CreateActionRequest;
use pme_backend::api::plans::CreatePlanRequest;
use pme_backend::api::resources::CreateResourceRequest;
use pme_backend::api::{actions, plans, resources};
use pme_backend::db::Db;
use pme_backend::error::AppError;
use chrono::Utc;
use pme_backend::models::{new_id, Action, Plan, UNASSIGNED_ACTION};
use tempfile::TempDir;
use uuid::Uuid;

async fn test_db() -> (Db, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("test.db");
    let db = Db::new(path.to_str().expect("utf8 path"))
        .await
        .expect("db init");
    (db, dir)
}

async fn create_plan(db: &Db, id_colegio: &str, year: i64, clonar: bool) -> (String, usize) {
    let (_, response) = plans::create_plan(
        State(db.clone()),
        Json(CreatePlanRequest {
            year,
            id_colegio: id_colegio.to_string(),
            director: "Dir".to_string(),
            observacion: "Obs".to_string(),
            clonar,
        }),
    )
    .await
    .expect("create plan");
    (response.id_pme.clone(), response.copiados)
}

fn action_request(id_pme: &str, year: i64, nombre: &str) -> CreateActionRequest {
    CreateActionRequest {
        uuid_accion: None,
        id_pme: id_pme.to_string(),
        year,
        nombre_accion: nombre.to_string(),
        descripcion: "Descripción".to_string(),
        dimension: "Gestión Pedagógica".to_string(),
        subdimensiones: vec!["Enseñanza".to_string()],
        objetivo_estrategico: None,
        estrategia: None,
        planes: None,
        responsable: Some("UTP".to_string()),
        recursos_necesarios_ejecucion: None,
        medios_verificacion: None,
        monto_sep: 1000,
        monto_total: 1500,
    }
}

fn resource_request(id_pme: &str, uuid_accion: &str, year: i64) -> CreateResourceRequest {
    CreateResourceRequest {
        id_pme: id_pme.to_string(),
        uuid_accion: uuid_accion.to_string(),
        dimension: None,
        subdimension: None,
        nombre_actividad: Some("Compra de material".to_string()),
        descripcion_actividad: None,
        medios_ver: None,
        responsable: None,
        recursos_actividad: vec!["libros".to_string()],
        monto: 500,
        year,
    }
}

#[tokio::test]
async fn test_clone_copies_actions_and_resources_with_new_keys() {
    let (db, _dir) = test_db().await;

    // 2024 plan with two actions; the first has two resources
    let (old_plan, _) = create_plan(&db, "col-1", 2024, false).await;
    let (_, a1) = actions::create_action(State(db.clone()), Json(action_request(&old_plan, 2024, "A1")))
        .await
        .expect("action 1");
    let (_, a2) = actions::create_action(State(db.clone()), Json(action_request(&old_plan, 2024, "A2")))
        .await
        .expect("action 2");
    for _ in 0..2 {
        resources::create_resource(
            State(db.clone()),
            Json(resource_request(&old_plan, &a1.uuid, 2024)),
        )
        .await
        .expect("resource");
    }

    // Create the 2025 plan with cloning enabled
    let (new_plan, copiados) = create_plan(&db, "col-1", 2025, true).await;
    assert_eq!(copiados, 2);

    let cloned_actions = db.list_actions(&new_plan).await.expect("cloned actions");
    assert_eq!(cloned_actions.len(), 2);
    for action in &cloned_actions {
        assert_eq!(action.id_pme, new_plan);
        assert_eq!(action.year, 2025);
        assert_ne!(action.uuid_accion, a1.uuid);
        assert_ne!(action.uuid_accion, a2.uuid);
    }

    // Resources follow the cloned action named A1
    let cloned_a1 = cloned_actions
        .iter()
        .find(|a| a.nombre_accion == "A1")
        .expect("cloned A1");
    let cloned_resources = db
        .list_resources_by_action(&cloned_a1.uuid_accion)
        .await
        .expect("cloned resources");
    assert_eq!(cloned_resources.len(), 2);
    for resource in &cloned_resources {
        assert_eq!(resource.id_pme, new_plan);
        assert_eq!(resource.year, 2025);
    }

    // The old plan keeps its own rows untouched
    assert_eq!(db.list_actions(&old_plan).await.unwrap().len(), 2);
    assert_eq!(
        db.list_resources_by_action(&a1.uuid).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_clone_without_previous_year_copies_nothing() {
    let (db, _dir) = test_db().await;
    let (_, copiados) = create_plan(&db, "col-9", 2025, true).await;
    assert_eq!(copiados, 0);
}

#[tokio::test]
async fn test_delete_plan_cascades_to_actions_and_resources() {
    let (db, _dir) = test_db().await;

    let (plan, _) = create_plan(&db, "col-1", 2025, false).await;
    let (_, action) = actions::create_action(State(db.clone()), Json(action_request(&plan, 2025, "A1")))
        .await
        .expect("action");
    resources::create_resource(
        State(db.clone()),
        Json(resource_request(&plan, &action.uuid, 2025)),
    )
    .await
    .expect("resource");
    // An orphan resource of the same plan must also go
    resources::create_resource(
        State(db.clone()),
        Json(resource_request(&plan, UNASSIGNED_ACTION, 2025)),
    )
    .await
    .expect("orphan resource");

    plans::delete_plan(State(db.clone()), Path(plan.clone()))
        .await
        .expect("delete plan");

    assert!(db.list_actions(&plan).await.unwrap().is_empty());
    assert!(db.list_resources_by_plan(&plan).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_action_cascades_to_its_resources_only() {
    let (db, _dir) = test_db().await;

    let (plan, _) = create_plan(&db, "col-1", 2025, false).await;
    let (_, a1) = actions::create_action(State(db.clone()), Json(action_request(&plan, 2025, "A1")))
        .await
        .expect("action 1");
    let (_, a2) = actions::create_action(State(db.clone()), Json(action_request(&plan, 2025, "A2")))
        .await
        .expect("action 2");
    resources::create_resource(
        State(db.clone()),
        Json(resource_request(&plan, &a1.uuid, 2025)),
    )
    .await
    .expect("r1");
    resources::create_resource(
        State(db.clone()),
        Json(resource_request(&plan, &a2.uuid, 2025)),
    )
    .await
    .expect("r2");

    actions::delete_action(State(db.clone()), Path(a1.uuid.clone()))
        .await
        .expect("delete action");

    assert!(db
        .list_resources_by_action(&a1.uuid)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        db.list_resources_by_action(&a2.uuid).await.unwrap().len(),
        1
    );
    assert_eq!(db.list_actions(&plan).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_plan_insert_rolls_back_when_cloned_rows_fail() {
    let (db, _dir) = test_db().await;

    let plan = Plan::new(
        2025,
        "col-1".to_string(),
        "Dir".to_string(),
        "Obs".to_string(),
    );
    let action = |uuid: &str| Action {
        id: new_id(),
        uuid_accion: uuid.to_string(),
        id_pme: plan.id.clone(),
        year: 2025,
        nombre_accion: "A1".to_string(),
        descripcion: "Descripción".to_string(),
        dimension: "Liderazgo".to_string(),
        subdimensiones: vec![],
        objetivo_estrategico: None,
        estrategia: None,
        planes: None,
        responsable: None,
        recursos_necesarios_ejecucion: None,
        medios_verificacion: None,
        monto_sep: 0,
        monto_total: 0,
        fecha_actualizacion: Utc::now(),
    };

    // Two copied actions sharing a business key violate the UNIQUE
    // constraint mid-insert
    let duplicated = Uuid::new_v4().to_string();
    let result = db
        .create_plan(&plan, &[action(&duplicated), action(&duplicated)], &[])
        .await;
    assert!(result.is_err());

    // Neither the plan nor the first action survives the rollback
    assert!(!db.plan_exists(&plan.id).await.expect("exists check"));
    assert!(db.list_actions(&plan.id).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_create_action_requires_existing_plan() {
    let (db, _dir) = test_db().await;
    let result =
        actions::create_action(State(db), Json(action_request("ghost-plan", 2025, "A1"))).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_missing_action_is_404() {
    let (db, _dir) = test_db().await;
    let result = actions::delete_action(State(db), Path("ghost".to_string())).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
