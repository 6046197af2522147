use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::StoreError;

use super::Conjunction;

#[derive(Debug, Default, Clone, Copy, Serialize, ToSchema)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

struct Inner {
    by_pair: HashMap<(u32, u32), Conjunction>,
    next_id: u64,
}

/// File-backed conjunction store with closest-so-far semantics: for each
/// unordered pair the stored miss distance only ever decreases.
pub struct ConjunctionStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl ConjunctionStore {
    pub fn open(base: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(base)?;
        let path = base.join("conjunctions.json");

        let mut by_pair = HashMap::new();
        let mut next_id = 1;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let list: Vec<Conjunction> = serde_json::from_str(&content)?;
            for conjunction in list {
                if let Some(id) = conjunction.id {
                    next_id = next_id.max(id + 1);
                }
                by_pair.insert(conjunction.pair_key(), conjunction);
            }
        }

        debug!("Opened conjunction store with {} rows", by_pair.len());

        Ok(ConjunctionStore {
            path,
            inner: RwLock::new(Inner { by_pair, next_id }),
        })
    }

    pub fn count(&self) -> usize {
        self.inner.read().unwrap().by_pair.len()
    }

    pub fn all(&self) -> Vec<Conjunction> {
        self.inner.read().unwrap().by_pair.values().cloned().collect()
    }

    /// Insert each conjunction, replacing an existing row for the same pair
    /// only if the new miss distance is strictly smaller.
    pub fn batch_upsert_if_closer(
        &self,
        batch: Vec<Conjunction>,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let mut outcome = UpsertOutcome::default();

        for mut conjunction in batch {
            let key = conjunction.pair_key();
            let existing = inner
                .by_pair
                .get(&key)
                .map(|c| (c.id, c.miss_distance_km));
            match existing {
                None => {
                    conjunction.id = Some(inner.next_id);
                    inner.next_id += 1;
                    inner.by_pair.insert(key, conjunction);
                    outcome.inserted += 1;
                }
                Some((id, stored_miss_km))
                    if conjunction.miss_distance_km < stored_miss_km =>
                {
                    conjunction.id = id;
                    inner.by_pair.insert(key, conjunction);
                    outcome.updated += 1;
                }
                Some(_) => outcome.unchanged += 1,
            }
        }

        if outcome.inserted + outcome.updated > 0 {
            self.persist(&inner)?;
        }
        Ok(outcome)
    }

    /// Stored conjunctions ordered by miss distance, closest first.
    pub fn get_conjunctions(&self, page: usize, page_size: usize) -> Page<Conjunction> {
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Conjunction> = inner.by_pair.values().cloned().collect();
        rows.sort_by(|a, b| {
            a.miss_distance_km
                .total_cmp(&b.miss_distance_km)
                .then_with(|| a.time_of_closest_approach.cmp(&b.time_of_closest_approach))
        });

        let total = rows.len();
        let items = rows
            .into_iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .collect();

        Page {
            items,
            page,
            page_size,
            total,
        }
    }

    fn persist(&self, inner: &Inner) -> Result<(), StoreError> {
        let list: Vec<&Conjunction> = inner.by_pair.values().collect();
        std::fs::write(&self.path, serde_json::to_vec(&list)?)?;
        Ok(())
    }
}
