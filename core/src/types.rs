//! Domain types for tasks.
//!
//! # Design
//! `TaskDto` and the request payloads mirror the REST contract, whose JSON
//! keys are `titulo` / `descripcion`; serde renames keep Rust field names in
//! English. `TaskRow` is the local table's shape. Both convert field-for-field
//! into `Task`, the model controllers publish to the UI. The mock-server crate
//! defines its own copies; integration tests catch schema drift.

use serde::{Deserialize, Serialize};

/// A task as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// A task as exchanged with the remote API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDto {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
}

/// Request payload for creating a new task. The server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreateRequest {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
}

/// Request payload for replacing an existing task's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskUpdateRequest {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
}

/// A row of the local `tareas` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// A row to insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTaskRow {
    pub title: String,
    pub description: String,
}

impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description,
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_uses_wire_field_names() {
        let dto = TaskDto {
            id: 7,
            title: "Comprar pan".to_string(),
            description: "Integral".to_string(),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["titulo"], "Comprar pan");
        assert_eq!(json["descripcion"], "Integral");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn create_request_omits_id() {
        let body = TaskCreateRequest {
            title: "A".to_string(),
            description: "d".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["titulo"], "A");
    }

    #[test]
    fn dto_rejects_missing_title() {
        let result: Result<TaskDto, _> = serde_json::from_str(r#"{"id":1,"descripcion":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn dto_and_row_map_into_task() {
        let from_dto: Task = TaskDto {
            id: 1,
            title: "A".to_string(),
            description: "d1".to_string(),
        }
        .into();
        let from_row: Task = TaskRow {
            id: 1,
            title: "A".to_string(),
            description: "d1".to_string(),
        }
        .into();
        assert_eq!(from_dto, from_row);
    }
}
