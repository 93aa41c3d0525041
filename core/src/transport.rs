//! Executing `HttpRequest`s and the async remote API built on top.
//!
//! # Design
//! `Transport` is the only place the core touches the network. Non-2xx
//! statuses come back as data so `TaskClient::parse_*` stays the single
//! authority on what a response means; only failures that never produced a
//! response become `ApiError::Transport`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::client::TaskClient;
use crate::config::RemoteConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{TaskCreateRequest, TaskDto, TaskUpdateRequest};

/// Performs one HTTP round-trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// A zero `timeout_ms` is rejected; it would fail every request at once.
    pub fn new(config: &RemoteConfig) -> Result<Self, ApiError> {
        if config.timeout_ms == 0 {
            return Err(ApiError::InvalidConfig("timeout_ms must be greater than zero".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.http.request(method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(status, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// The five remote operations as async calls returning decoded values.
#[derive(Clone)]
pub struct RemoteApi {
    client: TaskClient,
    transport: Arc<dyn Transport>,
}

impl RemoteApi {
    pub fn new(client: TaskClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    /// Builds a `RemoteApi` over `reqwest` from configuration.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(TaskClient::new(&config.base_url), Arc::new(transport)))
    }

    pub async fn list(&self) -> Result<Vec<TaskDto>, ApiError> {
        let response = self.transport.execute(self.client.build_list_tasks()).await?;
        self.client.parse_list_tasks(response)
    }

    pub async fn get(&self, id: i64) -> Result<TaskDto, ApiError> {
        let response = self.transport.execute(self.client.build_get_task(id)).await?;
        self.client.parse_get_task(response)
    }

    pub async fn create(&self, input: &TaskCreateRequest) -> Result<TaskDto, ApiError> {
        let request = self.client.build_create_task(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_task(response)
    }

    pub async fn update(&self, id: i64, input: &TaskUpdateRequest) -> Result<TaskDto, ApiError> {
        let request = self.client.build_update_task(id, input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_task(response)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_task(id)).await?;
        self.client.parse_delete_task(response)
    }
}
