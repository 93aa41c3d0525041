//! Async work tied to a controller's lifetime.
//!
//! Actions are spawned into a `JoinSet`; dropping the scope aborts whatever is
//! still running. Long-lived subscriptions go into a separate set that
//! `settle` does not wait on. The sets never leave the scope, so a dropped
//! `settle` future does not cancel anything.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::warn;

#[derive(Debug, Default)]
pub struct ControllerScope {
    actions: Mutex<JoinSet<()>>,
    background: Mutex<JoinSet<()>>,
    pending: Arc<Pending>,
}

/// Count of unfinished actions and a wakeup for when it reaches zero.
#[derive(Debug, Default)]
struct Pending {
    count: AtomicUsize,
    idle: Notify,
}

/// Held by a running action; releases its slot however the action ends.
struct InFlight(Arc<Pending>);

impl InFlight {
    fn enter(pending: &Arc<Pending>) -> Self {
        pending.count.fetch_add(1, Ordering::AcqRel);
        Self(pending.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl ControllerScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns one unit of work. Must be called within a Tokio runtime.
    pub fn launch<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let slot = InFlight::enter(&self.pending);
        let mut actions = self.actions.lock();
        while let Some(done) = actions.try_join_next() {
            report(done);
        }
        actions.spawn(async move {
            let _slot = slot;
            work.await;
        });
    }

    /// Spawns work that runs until the scope is dropped.
    pub fn launch_background<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.background.lock().spawn(work);
    }

    /// Waits until no launched action is running, including actions launched
    /// while waiting. Cancel-safe: dropping this future leaves actions running.
    pub async fn settle(&self) {
        loop {
            let mut idle = std::pin::pin!(self.pending.idle.notified());
            idle.as_mut().enable();
            if self.pending.count.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.count.load(Ordering::Acquire)
    }
}

fn report(done: Result<(), tokio::task::JoinError>) {
    if let Err(e) = done {
        if e.is_panic() {
            warn!(error = %e, "controller action panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn settle_waits_for_all_actions() {
        let scope = ControllerScope::new();
        let done = Arc::new(AtomicUsize::new(0));
        for i in 0..3u64 {
            let done = done.clone();
            scope.launch(async move {
                tokio::time::sleep(Duration::from_millis(5 * i)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        scope.settle().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(scope.in_flight(), 0);
    }

    #[tokio::test]
    async fn settle_ignores_background_work() {
        let scope = ControllerScope::new();
        scope.launch_background(std::future::pending::<()>());
        tokio::time::timeout(Duration::from_secs(1), scope.settle())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dropping_scope_aborts_running_work() {
        let finished = Arc::new(AtomicUsize::new(0));
        let scope = ControllerScope::new();
        let flag = finished.clone();
        scope.launch(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });
        drop(scope);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn abandoned_settle_leaves_actions_running() {
        let scope = ControllerScope::new();
        let done = Arc::new(AtomicUsize::new(0));
        let flag = done.clone();
        scope.launch(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });

        let waited = tokio::time::timeout(Duration::from_millis(10), scope.settle()).await;
        assert!(waited.is_err());
        assert_eq!(scope.in_flight(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(scope.in_flight(), 0);
        tokio::time::timeout(Duration::from_secs(1), scope.settle())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn panicking_action_still_releases_its_slot() {
        let scope = ControllerScope::new();
        scope.launch(async { panic!("boom") });
        tokio::time::timeout(Duration::from_secs(1), scope.settle())
            .await
            .unwrap();
        assert_eq!(scope.in_flight(), 0);
    }
}
