//! Stateless HTTP request builder and response parser for the tasks API.
//!
//! # Design
//! `TaskClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Any 2xx status counts as success; what the body must contain depends on
//! the operation.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{TaskCreateRequest, TaskDto, TaskUpdateRequest};

const TASKS_PATH: &str = "api/tareas";

/// Synchronous, stateless client for the tasks API.
#[derive(Debug, Clone)]
pub struct TaskClient {
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{TASKS_PATH}", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{TASKS_PATH}/{id}", self.base_url)
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_task(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_task(&self, input: &TaskCreateRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(json_request(HttpMethod::Post, self.collection_url(), body))
    }

    pub fn build_update_task(&self, id: i64, input: &TaskUpdateRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(json_request(HttpMethod::Put, self.item_url(id), body))
    }

    pub fn build_delete_task(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// An empty 2xx body is read as "no tasks".
    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<TaskDto>, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }
        decode(&response.body)
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<TaskDto, ApiError> {
        check_status(&response)?;
        decode_required(&response.body)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<TaskDto, ApiError> {
        check_status(&response)?;
        decode_required(&response.body)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<TaskDto, ApiError> {
        check_status(&response)?;
        decode_required(&response.body)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)?;
        Ok(())
    }
}

fn json_request(method: HttpMethod, path: String, body: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn decode_required<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::EmptyBody);
    }
    decode(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TaskClient {
        TaskClient::new("http://10.0.2.2:3000/")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_tasks_produces_correct_request() {
        let req = client().build_list_tasks();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://10.0.2.2:3000/api/tareas");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_task_produces_correct_request() {
        let req = client().build_get_task(42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://10.0.2.2:3000/api/tareas/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_task_produces_correct_request() {
        let input = TaskCreateRequest {
            title: "Comprar leche".to_string(),
            description: "Semidesnatada".to_string(),
        };
        let req = client().build_create_task(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://10.0.2.2:3000/api/tareas");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"titulo": "Comprar leche", "descripcion": "Semidesnatada"}));
    }

    #[test]
    fn build_update_task_produces_correct_request() {
        let input = TaskUpdateRequest {
            title: "Nuevo".to_string(),
            description: "Texto".to_string(),
        };
        let req = client().build_update_task(3, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://10.0.2.2:3000/api/tareas/3");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["titulo"], "Nuevo");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn build_delete_task_produces_correct_request() {
        let req = client().build_delete_task(9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://10.0.2.2:3000/api/tareas/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_tasks_success() {
        let resp = response(200, r#"[{"id":1,"titulo":"A","descripcion":"d1"}]"#);
        let tasks = client().parse_list_tasks(resp).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "A");
        assert_eq!(tasks[0].description, "d1");
    }

    #[test]
    fn parse_list_tasks_empty_body_is_empty_list() {
        let tasks = client().parse_list_tasks(response(200, "")).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn parse_list_tasks_bad_json() {
        let err = client().parse_list_tasks(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_get_task_not_found() {
        let err = client().parse_get_task(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_get_task_empty_body() {
        let err = client().parse_get_task(response(200, "")).unwrap_err();
        assert!(matches!(err, ApiError::EmptyBody));
    }

    #[test]
    fn parse_create_task_accepts_any_2xx() {
        let body = r#"{"id":5,"titulo":"Nueva","descripcion":""}"#;
        assert_eq!(client().parse_create_task(response(201, body)).unwrap().id, 5);
        assert_eq!(client().parse_create_task(response(200, body)).unwrap().id, 5);
    }

    #[test]
    fn parse_create_task_wrong_status() {
        let err = client()
            .parse_create_task(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, ref body } if body == "internal error"));
    }

    #[test]
    fn parse_update_task_not_found() {
        let err = client().parse_update_task(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_delete_task_ignores_body() {
        assert!(client().parse_delete_task(response(204, "")).is_ok());
        assert!(client().parse_delete_task(response(200, "{}")).is_ok());
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let client = TaskClient::new("http://localhost:3000//");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.build_list_tasks().path, "http://localhost:3000/api/tareas");
    }
}
