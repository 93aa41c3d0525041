use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tarea {
    pub id: i64,
    pub titulo: String,
    pub descripcion: String,
}

#[derive(Deserialize)]
pub struct TareaInput {
    pub titulo: String,
    pub descripcion: String,
}

#[derive(Default)]
pub struct Db {
    tareas: BTreeMap<i64, Tarea>,
    last_id: i64,
}

pub type SharedDb = Arc<RwLock<Db>>;

pub fn app() -> Router {
    let db: SharedDb = Arc::default();
    Router::new()
        .route("/api/tareas", get(list_tareas).post(create_tarea))
        .route(
            "/api/tareas/{id}",
            get(get_tarea).put(update_tarea).delete(delete_tarea),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_tareas(State(db): State<SharedDb>) -> Json<Vec<Tarea>> {
    let db = db.read().await;
    Json(db.tareas.values().cloned().collect())
}

async fn create_tarea(
    State(db): State<SharedDb>,
    Json(input): Json<TareaInput>,
) -> (StatusCode, Json<Tarea>) {
    let mut db = db.write().await;
    db.last_id += 1;
    let tarea = Tarea {
        id: db.last_id,
        titulo: input.titulo,
        descripcion: input.descripcion,
    };
    db.tareas.insert(tarea.id, tarea.clone());
    info!(id = tarea.id, "created tarea");
    (StatusCode::CREATED, Json(tarea))
}

async fn get_tarea(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<Tarea>, StatusCode> {
    let db = db.read().await;
    db.tareas.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_tarea(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(input): Json<TareaInput>,
) -> Result<Json<Tarea>, StatusCode> {
    let mut db = db.write().await;
    let tarea = db.tareas.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    tarea.titulo = input.titulo;
    tarea.descripcion = input.descripcion;
    Ok(Json(tarea.clone()))
}

async fn delete_tarea(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut db = db.write().await;
    db.tareas
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tarea_serializes_with_wire_names() {
        let tarea = Tarea {
            id: 1,
            titulo: "Test".to_string(),
            descripcion: "Desc".to_string(),
        };
        let json = serde_json::to_value(&tarea).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["titulo"], "Test");
        assert_eq!(json["descripcion"], "Desc");
    }

    #[test]
    fn input_requires_both_fields() {
        let result: Result<TareaInput, _> = serde_json::from_str(r#"{"titulo":"Solo"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn input_ignores_client_supplied_id() {
        let input: TareaInput =
            serde_json::from_str(r#"{"id":99,"titulo":"A","descripcion":"d"}"#).unwrap();
        assert_eq!(input.titulo, "A");
    }
}
