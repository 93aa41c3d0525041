//! The surface both controllers present to a task screen.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::state::TasksUiState;

/// Operations a task screen dispatches, independent of the backend.
///
/// Each method runs its action to completion and records the outcome in the
/// UI state; failures never surface as return values.
#[async_trait]
pub trait TasksController: Send + Sync {
    fn state(&self) -> watch::Receiver<TasksUiState>;

    fn snapshot(&self) -> TasksUiState {
        self.state().borrow().clone()
    }

    async fn load_tasks(&self);

    async fn add_task(&self, title: String, description: String);

    async fn update_task(&self, id: i64, title: String, description: String);

    async fn delete_task(&self, id: i64);

    fn clear_message(&self);
}
