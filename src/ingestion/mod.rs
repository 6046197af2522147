mod error;
mod log;
mod omm;
mod spacetrack;

pub use error::IngestionError;
pub use self::log::{IngestionLog, IngestionLogStore};
pub use omm::OmmRecord;
pub use spacetrack::{SpaceTrackClient, SpaceTrackConfig};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::CatalogStore;

use ::log::{debug, error, info};

/// Outcome of one catalog sync, returned to callers and persisted to the
/// ingestion log.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub objects_processed: usize,
    pub objects_created: usize,
    pub objects_updated: usize,
    pub objects_skipped: usize,
    pub objects_deleted: usize,
    pub successful: bool,
}

impl SyncReport {
    pub fn failed(started_at: DateTime<Utc>) -> Self {
        SyncReport {
            started_at,
            objects_processed: 0,
            objects_created: 0,
            objects_updated: 0,
            objects_skipped: 0,
            objects_deleted: 0,
            successful: false,
        }
    }
}

/// Full catalog synchronization from Space-Track: fetch the GP catalog,
/// drop satellites that left it, upsert the rest in batches, and append an
/// ingestion log entry regardless of outcome.
pub struct IngestionService {
    client: SpaceTrackClient,
    catalog: Arc<CatalogStore>,
    logs: IngestionLogStore,
    batch_size: usize,
}

impl IngestionService {
    pub fn new(
        client: SpaceTrackClient,
        catalog: Arc<CatalogStore>,
        logs: IngestionLogStore,
        batch_size: usize,
    ) -> Self {
        IngestionService {
            client,
            catalog,
            logs,
            batch_size,
        }
    }

    pub async fn sync(&self) -> SyncReport {
        info!("Starting catalog sync...");
        let start = Instant::now();
        let started_at = Utc::now();

        let records = match self.client.fetch_catalog().await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed synchronizing with Space-Track: {}", e);
                let report = SyncReport::failed(started_at);
                self.write_log(&report, Some(e.to_string()));
                return report;
            }
        };

        match self.process_records(records, started_at) {
            Ok(report) => {
                info!(
                    "Sync completed in {}ms. {} processed, {} created, {} updated, {} skipped, {} deleted",
                    start.elapsed().as_millis(),
                    report.objects_processed,
                    report.objects_created,
                    report.objects_updated,
                    report.objects_skipped,
                    report.objects_deleted
                );
                self.write_log(&report, None);
                report
            }
            Err(e) => {
                error!("Failed processing catalog records: {}", e);
                let report = SyncReport::failed(started_at);
                self.write_log(&report, Some(e.to_string()));
                report
            }
        }
    }

    /// Upsert the fetched records into the catalog store.
    pub fn process_records(
        &self,
        records: Vec<OmmRecord>,
        started_at: DateTime<Utc>,
    ) -> Result<SyncReport, IngestionError> {
        debug!("Processing {} records...", records.len());

        let catalog_ids: Vec<u32> = records
            .iter()
            .filter(|r| r.is_valid())
            .filter_map(|r| r.norad_cat_id)
            .collect::<HashSet<u32>>()
            .into_iter()
            .collect();

        let deleted = self.catalog.delete_by_cat_id_not_in(&catalog_ids)?;
        debug!("Deleted {} satellites not present in the new catalog", deleted);

        let mut processed = 0;
        let mut created = 0;
        let mut updated = 0;
        let mut skipped = 0;
        let mut batch = Vec::with_capacity(self.batch_size);

        for record in &records {
            let Some(satellite) = record.to_satellite() else {
                skipped += 1;
                continue;
            };

            if self.catalog.contains(satellite.norad_cat_id) {
                updated += 1;
            } else {
                created += 1;
            }
            batch.push(satellite);
            processed += 1;

            if batch.len() >= self.batch_size {
                debug!("Saving batch of {} satellites", batch.len());
                self.catalog.save_all(std::mem::take(&mut batch))?;
            }
        }

        if !batch.is_empty() {
            debug!("Saving batch of {} satellites", batch.len());
            self.catalog.save_all(batch)?;
        }

        Ok(SyncReport {
            started_at,
            objects_processed: processed,
            objects_created: created,
            objects_updated: updated,
            objects_skipped: skipped,
            objects_deleted: deleted,
            successful: true,
        })
    }

    /// The log write must survive a failed sync, so its own failure is only
    /// logged, never propagated.
    fn write_log(&self, report: &SyncReport, error_message: Option<String>) {
        if let Err(e) = self.logs.append(report, error_message) {
            error!("Failed writing ingestion log: {}", e);
        }
    }
}
