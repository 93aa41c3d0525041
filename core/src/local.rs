//! Task controller backed by the local SQLite store.
//!
//! The task list is never fetched by hand: a background subscription to
//! `TaskStore::watch_all` republishes the table into the UI state whenever
//! it changes. Writes go straight to the store and only leave a message.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::warn;

use crate::config::StoreConfig;
use crate::contract::TasksController;
use crate::error::{StoreError, StoreResult};
use crate::scope::ControllerScope;
use crate::state::{StateCell, TasksUiState};
use crate::store::TaskStore;
use crate::types::{NewTaskRow, Task, TaskRow};

pub const MSG_CREATED: &str = "Task created (local)";
pub const MSG_UPDATED: &str = "Task updated (local)";
pub const MSG_DELETED: &str = "Task deleted (local)";

pub struct LocalTasksController {
    shared: Arc<Shared>,
    scope: ControllerScope,
}

struct Shared {
    store: TaskStore,
    state: StateCell<TasksUiState>,
}

impl LocalTasksController {
    /// Starts the table subscription, so this must run inside a Tokio runtime.
    pub fn new(store: TaskStore) -> Self {
        let shared = Arc::new(Shared {
            store,
            state: StateCell::default(),
        });
        let scope = ControllerScope::new();

        let mut rows = shared.store.watch_all();
        let sink = shared.clone();
        scope.launch_background(async move {
            while let Some(next) = rows.next().await {
                match next {
                    Ok(table) => sink.state.update(|s| {
                        s.tasks = table.into_iter().map(Task::from).collect();
                    }),
                    Err(e) => sink.fail(&e),
                }
            }
        });

        Self { shared, scope }
    }

    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        Ok(Self::new(TaskStore::open(config)?))
    }

    pub fn store(&self) -> &TaskStore {
        &self.shared.store
    }

    /// The task with `id`, re-emitted on every table change.
    pub fn watch_task(&self, id: i64) -> BoxStream<'static, StoreResult<Option<Task>>> {
        self.shared
            .store
            .watch_task(id)
            .map(|row| row.map(|row| row.map(Task::from)))
            .boxed()
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

    pub async fn settle(&self) {
        self.scope.settle().await;
    }
}

impl Shared {
    async fn add_task(&self, title: String, description: String) {
        let row = NewTaskRow { title, description };
        match self.store.insert(row).await {
            Ok(_) => self.done(MSG_CREATED),
            Err(e) => self.fail(&e),
        }
    }

    async fn update_task(&self, id: i64, title: String, description: String) {
        let row = TaskRow {
            id,
            title,
            description,
        };
        match self.store.update(row).await {
            Ok(_) => self.done(MSG_UPDATED),
            Err(e) => self.fail(&e),
        }
    }

    async fn delete_task(&self, id: i64) {
        match self.store.delete_by_id(id).await {
            Ok(_) => self.done(MSG_DELETED),
            Err(e) => self.fail(&e),
        }
    }

    fn done(&self, message: &str) {
        self.state.update(|s| {
            s.error = None;
            s.message = Some(message.to_string());
        });
    }

    fn fail(&self, err: &StoreError) {
        warn!(error = %err, "local task action failed");
        self.state.update(|s| {
            s.error = Some(err.to_string());
            s.loading = false;
        });
    }
}

#[async_trait]
impl TasksController for LocalTasksController {
    fn state(&self) -> watch::Receiver<TasksUiState> {
        self.shared.state.subscribe()
    }

    /// The subscription already keeps the list current.
    async fn load_tasks(&self) {}

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
