use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::StoreError;

use super::SyncReport;

/// One sync attempt, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionLog {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub objects_processed: usize,
    pub objects_created: usize,
    pub objects_updated: usize,
    pub objects_skipped: usize,
    pub objects_deleted: usize,
    pub successful: bool,
    pub error_message: Option<String>,
}

/// Append-only JSON-lines ingestion history. Writes are independent of the
/// sync outcome so a failed sync still leaves an observable record.
pub struct IngestionLogStore {
    path: PathBuf,
}

impl IngestionLogStore {
    pub fn open(base: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(base)?;
        Ok(IngestionLogStore {
            path: base.join("ingestion_log.jsonl"),
        })
    }

    pub fn append(&self, report: &SyncReport, error_message: Option<String>) -> Result<(), StoreError> {
        let entry = IngestionLog {
            started_at: report.started_at,
            completed_at: Utc::now(),
            objects_processed: report.objects_processed,
            objects_created: report.objects_created,
            objects_updated: report.objects_updated,
            objects_skipped: report.objects_skipped,
            objects_deleted: report.objects_deleted,
            successful: report.successful,
            error_message,
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(&entry)?)?;
        Ok(())
    }

    pub fn entries(&self) -> Result<Vec<IngestionLog>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            entries.push(serde_json::from_str(line)?);
        }
        Ok(entries)
    }
}
