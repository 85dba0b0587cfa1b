//! The storage engine: one `rusqlite` connection behind an async mutex.
//!
//! Handlers are async and `.await` around database calls while holding the
//! lock, so the connection is wrapped in `tokio::sync::Mutex` rather than
//! `std::sync::Mutex`.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::error::SqliteResultExt;
use crate::schema;
use arc_core::Result;

/// Owns the single writable connection to the issue graph database.
pub struct StorageEngine {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl StorageEngine {
    /// Open (creating if absent) the database at `<data_dir>/data.db`,
    /// enable WAL and foreign keys, and run any pending migrations.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| arc_core::Error::Storage(format!("creating data directory: {e}")))?;
        let path = data_dir.join("data.db");

        let mut conn = Connection::open(&path).storage_err()?;
        conn.pragma_update(None, "journal_mode", "WAL").storage_err()?;
        conn.pragma_update(None, "foreign_keys", "ON").storage_err()?;

        schema::migrate(&mut conn)?;

        info!(path = %path.display(), "storage engine opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Open an in-memory database, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().storage_err()?;
        conn.pragma_update(None, "foreign_keys", "ON").storage_err()?;
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// The database file path this engine was opened against.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the connection for read-only or self-contained queries.
    pub async fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    /// Run `f` inside a single transaction, committing on `Ok` and rolling
    /// back on `Err`. Repository methods that compose multiple statements
    /// (e.g. insert a row, then record an audit event) use this instead of
    /// issuing each statement against its own implicit transaction.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().storage_err()?;
        let result = f(&tx)?;
        tx.commit().storage_err()?;
        Ok(result)
    }

    /// Liveness check: does a trivial query succeed against the connection.
    pub async fn health(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}
