//! Observable UI state.

use tokio::sync::watch;

use crate::types::Task;

/// What a task screen renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksUiState {
    pub loading: bool,
    pub error: Option<String>,
    pub message: Option<String>,
    pub tasks: Vec<Task>,
}

/// Single-writer container for a state value.
///
/// `update` replaces the value atomically under the channel's lock, so
/// concurrent actions never observe or publish a half-applied change.
#[derive(Debug)]
pub struct StateCell<S> {
    tx: watch::Sender<S>,
}

impl<S: Clone> StateCell<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    pub fn set(&self, value: S) {
        self.tx.send_replace(value);
    }

    pub fn get(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}

impl<S: Clone + Default> Default for StateCell<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = TasksUiState::default();
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.message.is_none());
        assert!(state.tasks.is_empty());
    }

    #[tokio::test]
    async fn update_notifies_subscribers() {
        let cell: StateCell<TasksUiState> = StateCell::default();
        let mut rx = cell.subscribe();
        cell.update(|s| s.loading = true);
        rx.changed().await.unwrap();
        assert!(rx.borrow().loading);
    }

    #[test]
    fn updates_touch_only_named_fields() {
        let cell: StateCell<TasksUiState> = StateCell::default();
        cell.update(|s| s.message = Some("hola".to_string()));
        cell.update(|s| s.error = Some("fallo".to_string()));
        let state = cell.get();
        assert_eq!(state.message.as_deref(), Some("hola"));
        assert_eq!(state.error.as_deref(), Some("fallo"));
    }
}
