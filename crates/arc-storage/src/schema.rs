//! Schema migrations for the issue graph store.
//!
//! Each migration is an up/down SQL pair, numbered and tracked in
//! `schema_migrations`. Migrations run inside a single transaction at
//! startup and are idempotent (`CREATE TABLE IF NOT EXISTS`). A migration
//! that needs to drop a column recreates the table (`CREATE TABLE x_new`,
//! copy, drop, rename) since SQLite has no native `DROP COLUMN` on the
//! bundled version this crate ships.

use rusqlite::Connection;

use crate::Result;

/// A single numbered schema change.
pub struct Migration {
    /// Monotonically increasing version number.
    pub version: i64,
    /// SQL applied when moving forward to this version.
    pub up: &'static str,
    /// SQL applied when rolling back from this version.
    #[allow(dead_code)] // exposed for operators rolling back by hand; no caller yet
    pub down: &'static str,
}

const V1_UP: &str = r"
CREATE TABLE IF NOT EXISTS workspaces (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    path TEXT,
    description TEXT,
    prefix TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS issues (
    id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL,
    priority INTEGER NOT NULL,
    rank INTEGER NOT NULL DEFAULT 0,
    issue_type TEXT NOT NULL,
    assignee TEXT,
    external_ref TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    closed_at TEXT,
    close_reason TEXT
);

CREATE INDEX IF NOT EXISTS idx_issues_workspace ON issues(workspace_id);
CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(workspace_id, status);
CREATE INDEX IF NOT EXISTS idx_issues_assignee ON issues(assignee);

CREATE TABLE IF NOT EXISTS dependencies (
    issue_id TEXT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    depends_on_id TEXT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    dep_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    PRIMARY KEY (issue_id, depends_on_id)
);

CREATE INDEX IF NOT EXISTS idx_dependencies_target ON dependencies(depends_on_id);

CREATE TABLE IF NOT EXISTS labels (
    workspace_id TEXT NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    color TEXT,
    description TEXT,
    PRIMARY KEY (workspace_id, name)
);

CREATE TABLE IF NOT EXISTS issue_labels (
    issue_id TEXT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    workspace_id TEXT NOT NULL,
    label_name TEXT NOT NULL,
    PRIMARY KEY (issue_id, label_name),
    FOREIGN KEY (workspace_id, label_name) REFERENCES labels(workspace_id, name) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS config (
    workspace_id TEXT NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (workspace_id, key)
);

CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id TEXT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    author TEXT NOT NULL,
    text TEXT NOT NULL,
    comment_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id, comment_type);

CREATE TABLE IF NOT EXISTS plans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workspace_id TEXT NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS issue_plans (
    issue_id TEXT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
    PRIMARY KEY (issue_id, plan_id)
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id TEXT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    event_type TEXT NOT NULL,
    actor TEXT NOT NULL,
    old_value TEXT,
    new_value TEXT,
    comment TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_issue ON events(issue_id, id DESC);
";

const V1_DOWN: &str = r"
DROP TABLE IF EXISTS events;
DROP TABLE IF EXISTS issue_plans;
DROP TABLE IF EXISTS plans;
DROP TABLE IF EXISTS comments;
DROP TABLE IF EXISTS config;
DROP TABLE IF EXISTS issue_labels;
DROP TABLE IF EXISTS labels;
DROP TABLE IF EXISTS dependencies;
DROP TABLE IF EXISTS issues;
DROP TABLE IF EXISTS workspaces;
";

/// Every migration this crate knows about, in ascending version order.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up: V1_UP,
    down: V1_DOWN,
}];

/// Apply every migration newer than the database's current version.
///
/// Runs inside a single transaction so a failure partway through leaves the
/// schema at its prior version rather than half-upgraded.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;

    let current: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.up)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![migration.version, chrono::Utc::now().to_rfc3339()],
        )?;
    }
    tx.commit()?;
    Ok(())
}
