//! Task controller backed by the remote REST API.
//!
//! # Design
//! Every action makes exactly one API call and records the outcome in
//! `TasksUiState`. Writes never patch the list locally: on success they set
//! an info message and reload the full list from the server. The selected
//! task lives in its own state cell so detail screens can observe it
//! independently of the list.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::contract::TasksController;
use crate::error::ApiError;
use crate::scope::ControllerScope;
use crate::state::{StateCell, TasksUiState};
use crate::transport::RemoteApi;
use crate::types::{Task, TaskCreateRequest, TaskUpdateRequest};

pub const MSG_CREATED: &str = "Task created";
pub const MSG_UPDATED: &str = "Task updated";
pub const MSG_DELETED: &str = "Task deleted";

pub struct RemoteTasksController {
    shared: Arc<Shared>,
    scope: ControllerScope,
}

struct Shared {
    api: RemoteApi,
    state: StateCell<TasksUiState>,
    selected: StateCell<Option<Task>>,
}

impl RemoteTasksController {
    pub fn new(api: RemoteApi) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                state: StateCell::default(),
                selected: StateCell::default(),
            }),
            scope: ControllerScope::new(),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, ApiError> {
        Ok(Self::new(RemoteApi::from_config(config)?))
    }

    pub fn selected(&self) -> watch::Receiver<Option<Task>> {
        self.shared.selected.subscribe()
    }

    pub fn selected_snapshot(&self) -> Option<Task> {
        self.shared.selected.get()
    }

    pub async fn load_task(&self, id: i64) {
        self.shared.load_task(id).await;
    }

    pub fn launch_load_tasks(&self) {
        let shared = self.shared.clone();
        self.scope.launch(async move { shared.load_tasks().await });
    }

    pub fn launch_load_task(&self, id: i64) {
        let shared = self.shared.clone();
        self.scope.launch(async move { shared.load_task(id).await });
    }

    pub fn launch_add_task(&self, title: String, description: String) {
        let shared = self.shared.clone();
        self.scope
            .launch(async move { shared.add_task(title, description).await });
    }

    pub fn launch_update_task(&self, id: i64, title: String, description: String) {
        let shared = self.shared.clone();
        self.scope
            .launch(async move { shared.update_task(id, title, description).await });
    }

    pub fn launch_delete_task(&self, id: i64) {
        let shared = self.shared.clone();
        self.scope.launch(async move { shared.delete_task(id).await });
    }

    /// Waits for every launched action to finish.
    pub async fn settle(&self) {
        self.scope.settle().await;
    }
}

impl Shared {
    async fn load_tasks(&self) {
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.api.list().await {
            Ok(dtos) => {
                debug!(count = dtos.len(), "loaded remote tasks");
                self.state.update(|s| {
                    s.tasks = dtos.into_iter().map(Task::from).collect();
                    s.loading = false;
                });
            }
            Err(e) => self.fail(&e, "load_tasks"),
        }
    }

    async fn load_task(&self, id: i64) {
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.api.get(id).await {
            Ok(dto) => {
                self.selected.set(Some(dto.into()));
                self.state.update(|s| s.loading = false);
            }
            Err(e) => {
                self.deselect(id);
                self.fail(&e, "load_task");
            }
        }
    }

    async fn add_task(&self, title: String, description: String) {
        self.begin_write();
        let body = TaskCreateRequest { title, description };
        match self.api.create(&body).await {
            Ok(created) => {
                debug!(id = created.id, "created remote task");
                self.finish_write(MSG_CREATED).await;
            }
            Err(e) => self.fail(&e, "add_task"),
        }
    }

    async fn update_task(&self, id: i64, title: String, description: String) {
        self.begin_write();
        let body = TaskUpdateRequest { title, description };
        match self.api.update(id, &body).await {
            Ok(updated) => {
                if matches!(self.selected.get(), Some(ref t) if t.id == id) {
                    self.selected.set(Some(updated.into()));
                }
                self.finish_write(MSG_UPDATED).await;
            }
            Err(e) => self.fail(&e, "update_task"),
        }
    }

    async fn delete_task(&self, id: i64) {
        self.begin_write();
        match self.api.delete(id).await {
            Ok(()) => {
                self.deselect(id);
                self.finish_write(MSG_DELETED).await;
            }
            Err(e) => self.fail(&e, "delete_task"),
        }
    }

    fn begin_write(&self) {
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
            s.message = None;
        });
    }

    async fn finish_write(&self, message: &str) {
        self.state.update(|s| s.message = Some(message.to_string()));
        self.load_tasks().await;
    }

    fn deselect(&self, id: i64) {
        self.selected.update(|selected| {
            if selected.as_ref().is_some_and(|t| t.id == id) {
                *selected = None;
            }
        });
    }

    fn fail(&self, err: &ApiError, action: &'static str) {
        warn!(action, error = %err, "remote task action failed");
        self.state.update(|s| {
            s.error = Some(err.to_string());
            s.loading = false;
        });
    }
}

#[async_trait]
impl TasksController for RemoteTasksController {
    fn state(&self) -> watch::Receiver<TasksUiState> {
        self.shared.state.subscribe()
    }

    async fn load_tasks(&self) {
        self.shared.load_tasks().await;
    }

    async fn add_task(&self, title: String, description: String) {
        self.shared.add_task(title, description).await;
    }

    async fn update_task(&self, id: i64, title: String, description: String) {
        self.shared.update_task(id, title, description).await;
    }

    async fn delete_task(&self, id: i64) {
        self.shared.delete_task(id).await;
    }

    fn clear_message(&self) {
        self.shared.state.update(|s| s.message = None);
    }
}
