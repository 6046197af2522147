mod cluster;
mod error;
mod pairs;
mod propagation;
mod refine;
mod sweep;

pub use cluster::{cluster_events, Event};
pub use error::ScreeningError;
pub use pairs::{reduce_pairs, SatellitePair};
pub use propagation::{
    build_propagators, distance_km, probe_pair_distance_km, probe_pair_speed_m_s, propagate_all,
    relative_speed_m_s, Propagator, PvCoordinates,
};
pub use refine::{brent_minimize, refine_event};
pub use sweep::{coarse_sweep, CoarseDetection};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::CatalogStore;
use crate::conjunction::{Conjunction, ConjunctionStore};

#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningConfig {
    /// Coarse-sweep detection cutoff in km; also inflates the pair-reducer
    /// shell intervals.
    #[serde(default = "default_tolerance_km")]
    pub tolerance_km: f64,
    /// Final conjunction cutoff in km, applied after refinement.
    #[serde(default = "default_threshold_km")]
    pub threshold_km: f64,
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: u32,
    #[serde(default = "default_step_seconds")]
    pub step_seconds: u32,
}

fn default_tolerance_km() -> f64 {
    50.0
}

fn default_threshold_km() -> f64 {
    5.0
}

fn default_lookahead_hours() -> u32 {
    24
}

fn default_step_seconds() -> u32 {
    3
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        ScreeningConfig {
            tolerance_km: default_tolerance_km(),
            threshold_km: default_threshold_km(),
            lookahead_hours: default_lookahead_hours(),
            step_seconds: default_step_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScreeningReport {
    pub started_at: DateTime<Utc>,
    pub satellites: usize,
    pub candidate_pairs: usize,
    pub detections: usize,
    pub events: usize,
    pub conjunctions: usize,
    pub duration_ms: u64,
}

/// Drives the screening pipeline: catalog -> pair reduction -> propagator
/// cache -> coarse sweep -> event clustering -> parallel refinement ->
/// threshold filter -> per-pair dedup -> conjunction store.
pub struct Screener {
    catalog: Arc<CatalogStore>,
    conjunctions: Arc<ConjunctionStore>,
    config: ScreeningConfig,
}

impl Screener {
    pub fn new(
        catalog: Arc<CatalogStore>,
        conjunctions: Arc<ConjunctionStore>,
        config: ScreeningConfig,
    ) -> Self {
        Screener {
            catalog,
            conjunctions,
            config,
        }
    }

    pub fn run(&self, start: DateTime<Utc>) -> Result<ScreeningReport, ScreeningError> {
        let run_start = Instant::now();
        info!("Starting conjunction screening...");

        let satellites = self.catalog.all();
        debug!("Loaded {} satellites", satellites.len());

        let pairs = reduce_pairs(&satellites, self.config.tolerance_km);
        let candidate_pairs = pairs.len();

        let propagators = build_propagators(&satellites);

        let detections = coarse_sweep(
            &pairs,
            &propagators,
            start,
            self.config.tolerance_km,
            self.config.step_seconds,
            self.config.lookahead_hours,
        );
        // The candidate pair list dominates peak memory; it is not needed
        // past the sweep.
        drop(pairs);

        if detections.is_empty() {
            warn!("No close approaches detected in lookahead window");
            return Ok(ScreeningReport {
                started_at: start,
                satellites: satellites.len(),
                candidate_pairs,
                detections: 0,
                events: 0,
                conjunctions: 0,
                duration_ms: run_start.elapsed().as_millis() as u64,
            });
        }
        let detection_count = detections.len();
        info!("Coarse sweep found {} detections", detection_count);

        let events: Vec<Event> = cluster_events(detections, self.config.step_seconds)
            .into_values()
            .flatten()
            .collect();
        let event_count = events.len();

        info!("Refining {} events...", event_count);
        let refine_start = Instant::now();
        let under_threshold: Vec<Conjunction> = events
            .par_iter()
            .filter_map(|event| refine_event(event, &propagators, self.config.step_seconds))
            .filter(|candidate| candidate.miss_distance_km <= self.config.threshold_km)
            .collect();
        info!(
            "Refined to {} conjunctions below {}km threshold in {}ms",
            under_threshold.len(),
            self.config.threshold_km,
            refine_start.elapsed().as_millis()
        );

        let deduplicated = dedup_closest(under_threshold);
        debug!("Deduplicated to {} unique pairs", deduplicated.len());

        if !deduplicated.is_empty() {
            self.conjunctions
                .batch_upsert_if_closer(deduplicated.clone())?;
        }

        info!(
            "Conjunction screening completed in {}ms",
            run_start.elapsed().as_millis()
        );

        Ok(ScreeningReport {
            started_at: start,
            satellites: satellites.len(),
            candidate_pairs,
            detections: detection_count,
            events: event_count,
            conjunctions: deduplicated.len(),
            duration_ms: run_start.elapsed().as_millis() as u64,
        })
    }
}

/// Keep the closest candidate per unordered pair; equal miss distances
/// resolve to the earlier TCA so reruns pick the same winner.
fn dedup_closest(candidates: Vec<Conjunction>) -> Vec<Conjunction> {
    let mut best: HashMap<(u32, u32), Conjunction> = HashMap::new();
    for candidate in candidates {
        match best.entry(candidate.pair_key()) {
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                let current = entry.get();
                let closer = candidate.miss_distance_km < current.miss_distance_km
                    || (candidate.miss_distance_km == current.miss_distance_km
                        && candidate.time_of_closest_approach < current.time_of_closest_approach);
                if closer {
                    entry.insert(candidate);
                }
            }
        }
    }
    best.into_values().collect()
}
