//! Core of a task ("tarea") manager with two independent backends.
//!
//! # Overview
//! - Remote: `TaskClient` builds and parses requests for the `/api/tareas`
//!   REST contract without touching the network; a `Transport` executes them
//!   and `RemoteApi` pairs the two into async calls.
//! - Local: `TaskStore` keeps tasks in SQLite and pushes table changes to
//!   subscribers as streams.
//! - `RemoteTasksController` and `LocalTasksController` turn user actions
//!   into `TasksUiState` updates behind the shared `TasksController` trait.
//!
//! # Design
//! - The backends are never reconciled; each controller owns its own state.
//! - Controller failures are recorded as messages in the UI state and never
//!   returned to the caller.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod http;
pub mod local;
pub mod remote;
pub mod scope;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;

pub use client::TaskClient;
pub use config::{Config, RemoteConfig, StoreConfig};
pub use contract::TasksController;
pub use error::{ApiError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use local::LocalTasksController;
pub use remote::RemoteTasksController;
pub use scope::ControllerScope;
pub use state::{StateCell, TasksUiState};
pub use store::TaskStore;
pub use transport::{RemoteApi, ReqwestTransport, Transport};
pub use types::{NewTaskRow, Task, TaskCreateRequest, TaskDto, TaskRow, TaskUpdateRequest};
