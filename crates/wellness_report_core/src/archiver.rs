//! Persistence of finished reports as immutable snapshots.
//!
//! Bodies live under `report.<id>`; the newest-first index lives under
//! [`INDEX_KEY`] so listings never load bodies.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{HealthReport, ReportIndexEntry};
use crate::store::KeyValueStore;
use crate::{ReportError, ReportResult, export, observability};

pub const INDEX_KEY: &str = "report-index";
const BODY_PREFIX: &str = "report.";

pub fn is_valid_report_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

fn body_key(id: &str) -> String {
    format!("{BODY_PREFIX}{id}")
}

pub struct Archiver {
    store: Arc<dyn KeyValueStore>,
    // serializes index read-modify-write within this process
    index_lock: Mutex<()>,
}

impl Archiver {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            index_lock: Mutex::new(()),
        }
    }

    /// Persist `report` and return its id.
    ///
    /// A report without an id gets a fresh one. Saving an id that already
    /// exists overwrites the body and replaces its index entry in place.
    pub async fn save(&self, report: &HealthReport) -> ReportResult<String> {
        let assigned;
        let report = if report.id.is_empty() {
            assigned = HealthReport {
                id: Uuid::new_v4().to_string(),
                ..report.clone()
            };
            &assigned
        } else {
            report
        };
        if !is_valid_report_id(&report.id) {
            return Err(ReportError::Persistence(format!(
                "invalid report id: {:?}",
                report.id
            )));
        }

        let body = serde_json::to_string(report)?;
        let _guard = self.index_lock.lock().await;

        self.store.set(&body_key(&report.id), body).await?;

        let mut index = self.read_index().await?;
        let entry = ReportIndexEntry::for_report(report);
        match index.iter_mut().find(|e| e.id == report.id) {
            Some(existing) => *existing = entry,
            None => index.insert(0, entry),
        }
        index.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.write_index(&index).await?;

        observability::record_report_saved();
        info!(report_id = %report.id, entries = index.len(), "report saved");
        Ok(report.id.clone())
    }

    /// Index entries, newest first.
    pub async fn list(&self) -> ReportResult<Vec<ReportIndexEntry>> {
        self.read_index().await
    }

    /// The stored snapshot, verbatim.
    pub async fn load(&self, id: &str) -> ReportResult<HealthReport> {
        if !is_valid_report_id(id) {
            return Err(ReportError::NotFound(id.to_string()));
        }
        match self.store.get(&body_key(id)).await? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => {
                debug!(report_id = %id, "report not in store");
                Err(ReportError::NotFound(id.to_string()))
            }
        }
    }

    /// Remove a snapshot and its index entry. Other entries are untouched.
    pub async fn delete(&self, id: &str) -> ReportResult<()> {
        if !is_valid_report_id(id) {
            return Err(ReportError::NotFound(id.to_string()));
        }
        let _guard = self.index_lock.lock().await;

        let had_body = self.store.delete(&body_key(id)).await?;
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|e| e.id != id);
        let had_entry = index.len() != before;
        if had_entry {
            self.write_index(&index).await?;
        }
        if !had_body && !had_entry {
            return Err(ReportError::NotFound(id.to_string()));
        }
        info!(report_id = %id, "report deleted");
        Ok(())
    }

    pub fn export_text(&self, report: &HealthReport) -> String {
        export::render_report(report)
    }

    async fn read_index(&self) -> ReportResult<Vec<ReportIndexEntry>> {
        match self.store.get(INDEX_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_index(&self, index: &[ReportIndexEntry]) -> ReportResult<()> {
        let raw = serde_json::to_string(index)?;
        self.store.set(INDEX_KEY, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DerivedScores, DomainSnapshots};
    use crate::store::MemoryStore;
    use chrono::{DateTime, Utc};

    fn report(id: &str, ts: &str) -> HealthReport {
        HealthReport {
            id: id.to_string(),
            created_at: DateTime::parse_from_rfc3339(ts)
                .expect("ts")
                .with_timezone(&Utc),
            owner_ref: None,
            domain_snapshots: DomainSnapshots::default(),
            derived_scores: DerivedScores {
                overall_wellness: 73,
                facial_composite_score: 75.0,
                mental_composite_score: 70.0,
            },
        }
    }

    #[test]
    fn report_ids_must_be_plain() {
        assert!(is_valid_report_id("0b8c6f7e-1c2d-4e59-9f3a-8c1b2d3e4f50"));
        assert!(!is_valid_report_id("a.b"));
        assert!(!is_valid_report_id("../x"));
        assert!(!is_valid_report_id(""));
    }

    #[tokio::test]
    async fn save_assigns_id_when_absent() {
        let archiver = Archiver::new(Arc::new(MemoryStore::new()));
        let id = archiver
            .save(&report("", "2026-03-01T10:00:00Z"))
            .await
            .expect("save");
        assert!(!id.is_empty());
        let loaded = archiver.load(&id).await.expect("load");
        assert_eq!(loaded.id, id);
    }

    #[tokio::test]
    async fn save_rejects_unsafe_id() {
        let archiver = Archiver::new(Arc::new(MemoryStore::new()));
        let err = archiver
            .save(&report("../../etc", "2026-03-01T10:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Persistence(_)));
        assert!(archiver.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn list_is_empty_without_index() {
        let archiver = Archiver::new(Arc::new(MemoryStore::new()));
        assert!(archiver.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let archiver = Archiver::new(Arc::new(MemoryStore::new()));
        let err = archiver.delete("missing").await.unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)));
    }
}
