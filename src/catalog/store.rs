use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;
use thiserror::Error;

use super::Satellite;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// File-backed satellite catalog. The full catalog is held in memory and
/// rewritten to `catalog.json` on every mutation; reads never touch disk.
pub struct CatalogStore {
    path: PathBuf,
    satellites: RwLock<HashMap<u32, Satellite>>,
}

impl CatalogStore {
    pub fn open(base: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(base)?;
        let path = base.join("catalog.json");

        let satellites = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let list: Vec<Satellite> = serde_json::from_str(&content)?;
            list.into_iter().map(|s| (s.norad_cat_id, s)).collect()
        } else {
            HashMap::new()
        };

        debug!("Opened catalog store with {} satellites", satellites.len());

        Ok(CatalogStore {
            path,
            satellites: RwLock::new(satellites),
        })
    }

    pub fn all(&self) -> Vec<Satellite> {
        self.satellites.read().unwrap().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.satellites.read().unwrap().len()
    }

    pub fn find(&self, cat_id: u32) -> Option<Satellite> {
        self.satellites.read().unwrap().get(&cat_id).cloned()
    }

    pub fn contains(&self, cat_id: u32) -> bool {
        self.satellites.read().unwrap().contains_key(&cat_id)
    }

    /// Upsert a batch by catalog number.
    pub fn save_all(&self, batch: Vec<Satellite>) -> Result<(), StoreError> {
        let mut satellites = self.satellites.write().unwrap();
        for sat in batch {
            satellites.insert(sat.norad_cat_id, sat);
        }
        self.persist(&satellites)
    }

    /// Remove every satellite whose catalog number is not in `keep`.
    /// Returns the number of removed entries.
    pub fn delete_by_cat_id_not_in(&self, keep: &[u32]) -> Result<usize, StoreError> {
        let keep: std::collections::HashSet<u32> = keep.iter().copied().collect();
        let mut satellites = self.satellites.write().unwrap();
        let before = satellites.len();
        satellites.retain(|id, _| keep.contains(id));
        let removed = before - satellites.len();
        if removed > 0 {
            self.persist(&satellites)?;
        }
        Ok(removed)
    }

    fn persist(&self, satellites: &HashMap<u32, Satellite>) -> Result<(), StoreError> {
        let list: Vec<&Satellite> = satellites.values().collect();
        std::fs::write(&self.path, serde_json::to_vec(&list)?)?;
        Ok(())
    }
}
