//! Local task store over SQLite.
//!
//! # Design
//! One connection behind an async mutex; every write that touches a row bumps
//! a `watch` version counter. The `watch_*` streams re-run their query each
//! time the counter moves, so subscribers see the table's latest state
//! without polling. Bursts of writes may collapse into one emission.

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::types::{NewTaskRow, TaskRow};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tareas (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo      TEXT NOT NULL,
    descripcion TEXT NOT NULL
);";

/// Cheaply cloneable handle to the local `tareas` table.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Inner>,
}

struct Inner {
    conn: Mutex<Connection>,
    version: watch::Sender<u64>,
}

impl TaskStore {
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let conn = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        let (version, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                version,
            }),
        })
    }

    /// Inserts a row with a fresh id. Returns `None` if the insert was ignored
    /// due to a conflict.
    pub async fn insert(&self, row: NewTaskRow) -> StoreResult<Option<i64>> {
        let id = {
            let conn = self.inner.conn.lock().await;
            let changed = conn.execute(
                "INSERT OR IGNORE INTO tareas (titulo, descripcion) VALUES (?1, ?2)",
                params![row.title, row.description],
            )?;
            (changed > 0).then(|| conn.last_insert_rowid())
        };
        if let Some(id) = id {
            debug!(id, "inserted task row");
            self.notify();
        }
        Ok(id)
    }

    /// Inserts a row keeping its id. An existing id leaves the table untouched.
    pub async fn insert_row(&self, row: TaskRow) -> StoreResult<bool> {
        let changed = self.inner.conn.lock().await.execute(
            "INSERT OR IGNORE INTO tareas (id, titulo, descripcion) VALUES (?1, ?2, ?3)",
            params![row.id, row.title, row.description],
        )?;
        self.after_write("insert", row.id, changed);
        Ok(changed > 0)
    }

    /// Overwrites title and description by id. Returns the number of rows
    /// changed; zero when the id does not exist.
    pub async fn update(&self, row: TaskRow) -> StoreResult<usize> {
        let changed = self.inner.conn.lock().await.execute(
            "UPDATE tareas SET titulo = ?1, descripcion = ?2 WHERE id = ?3",
            params![row.title, row.description, row.id],
        )?;
        self.after_write("update", row.id, changed);
        Ok(changed)
    }

    pub async fn delete_by_id(&self, id: i64) -> StoreResult<usize> {
        let changed = self
            .inner
            .conn
            .lock()
            .await
            .execute("DELETE FROM tareas WHERE id = ?1", params![id])?;
        self.after_write("delete", id, changed);
        Ok(changed)
    }

    pub async fn get_task_once(&self, id: i64) -> StoreResult<Option<TaskRow>> {
        let conn = self.inner.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, titulo, descripcion FROM tareas WHERE id = ?1",
                params![id],
                map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All rows ordered by title, ties broken by id.
    pub async fn all_once(&self) -> StoreResult<Vec<TaskRow>> {
        let conn = self.inner.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, titulo, descripcion FROM tareas ORDER BY titulo ASC, id ASC")?;
        let rows = stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Emits the row (or `None`) now and again after every table change.
    pub fn watch_task(&self, id: i64) -> BoxStream<'static, StoreResult<Option<TaskRow>>> {
        self.watch_query(move |store| async move { store.get_task_once(id).await })
    }

    /// Emits the ordered table now and again after every table change.
    pub fn watch_all(&self) -> BoxStream<'static, StoreResult<Vec<TaskRow>>> {
        self.watch_query(|store| async move { store.all_once().await })
    }

    fn watch_query<T, F, Fut>(&self, query: F) -> BoxStream<'static, StoreResult<T>>
    where
        T: Send + 'static,
        F: Fn(TaskStore) -> Fut + Send + 'static,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let mut changes = self.inner.version.subscribe();
        changes.mark_changed();
        let state = (self.clone(), changes, query);
        stream::unfold(state, |(store, mut changes, query)| async move {
            changes.changed().await.ok()?;
            let value = query(store.clone()).await;
            Some((value, (store, changes, query)))
        })
        .boxed()
    }

    fn after_write(&self, op: &'static str, id: i64, changed: usize) {
        debug!(op, id, changed, "task row write");
        if changed > 0 {
            self.notify();
        }
    }

    fn notify(&self) {
        self.inner.version.send_modify(|v| *v += 1);
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
    })
}
