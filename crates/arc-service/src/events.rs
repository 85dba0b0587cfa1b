//! Event service: a read-only front for [`arc_storage::EventRepository`].
//!
//! Events are never written through this service — repositories record them
//! directly via [`arc_storage::EventRepository::record_tx`] as part of their
//! own transactions. This service only backs `GET .../events`.

use std::sync::Arc;

use arc_core::{Event, IssueId, Result};
use arc_storage::{EventRepository, StorageEngine};

/// Read-only access to an issue's audit trail.
pub struct EventService {
    repo: EventRepository,
}

impl EventService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            repo: EventRepository::new(engine),
        }
    }

    /// List an issue's events, newest first, capped at `limit` (default 50).
    pub async fn list_for_issue(&self, issue_id: &IssueId, limit: Option<i64>) -> Result<Vec<Event>> {
        self.repo.list_for_issue(issue_id, limit).await
    }
}
