//! Process-scoped analysis state shared with the display layer.
//!
//! `AnalysisSession` holds the latest result set and summary. The pipeline
//! is the only writer; views take read snapshots. A new run replaces the
//! previous snapshot wholesale, there is no merging across runs.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::ResultSet;
use crate::pipeline::batch::BatchOutcome;

/// Snapshot of one completed run.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub run_id: Uuid,
    pub results: ResultSet,
    pub summary: Option<String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    current: RwLock<Option<SessionSnapshot>>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<SessionSnapshot>> {
        // A panic while holding the lock leaves a whole snapshot in place.
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionSnapshot>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Store the outcome of a run.
    ///
    /// Only runs that produced results replace the stored snapshot; a run
    /// where every document failed leaves the previous results visible.
    /// Returns `true` when the snapshot was replaced.
    pub fn store_run(&self, outcome: &BatchOutcome) -> bool {
        if outcome.results.is_empty() {
            tracing::debug!("Run produced no results, keeping previous snapshot");
            return false;
        }

        let snapshot = SessionSnapshot {
            run_id: Uuid::new_v4(),
            results: outcome.results.clone(),
            summary: outcome.summary.clone(),
            completed_at: Utc::now(),
        };
        tracing::debug!(
            run_id = %snapshot.run_id,
            quarters = snapshot.results.len(),
            "Session snapshot replaced"
        );
        *self.write() = Some(snapshot);
        true
    }

    pub fn has_results(&self) -> bool {
        self.read().is_some()
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.read().clone()
    }

    pub fn results(&self) -> Option<ResultSet> {
        self.read().as_ref().map(|s| s.results.clone())
    }

    pub fn summary(&self) -> Option<String> {
        self.read().as_ref().and_then(|s| s.summary.clone())
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.read().as_ref().map(|s| s.run_id)
    }

    pub fn last_run_at(&self) -> Option<DateTime<Utc>> {
        self.read().as_ref().map(|s| s.completed_at)
    }

    pub fn clear(&self) {
        *self.write() = None;
    }
}
