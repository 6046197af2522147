use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use rayon::prelude::*;

use super::pairs::SatellitePair;
use super::propagation::{distance_km, propagate_all, Propagator};

/// One below-tolerance sample from the coarse sweep.
#[derive(Debug, Clone)]
pub struct CoarseDetection {
    pub pair: SatellitePair,
    pub time: DateTime<Utc>,
    pub distance_km: f64,
}

/// Step through the look-ahead window and record every candidate pair that
/// comes within `tolerance_km` at a sample instant.
///
/// Time is the outer loop: the whole cache is propagated once per step, so
/// the propagator cost is O(satellites x steps) while the per-pair work is a
/// cheap distance check against the shared snapshot. Pairs with a member
/// missing from the snapshot are skipped for that step.
pub fn coarse_sweep(
    pairs: &[SatellitePair],
    propagators: &HashMap<u32, Propagator>,
    start: DateTime<Utc>,
    tolerance_km: f64,
    step_seconds: u32,
    lookahead_hours: u32,
) -> Vec<CoarseDetection> {
    let window_seconds = lookahead_hours * 3600;
    let total_steps = (window_seconds / step_seconds) as usize;
    let log_interval = (total_steps / 10).max(1);
    debug!(
        "Coarse sweep: {} steps over {}h at {}s intervals, {} candidate pairs",
        total_steps, lookahead_hours, step_seconds, pairs.len()
    );

    let mut detections = Vec::new();

    for (step_count, offset_seconds) in (0..=window_seconds)
        .step_by(step_seconds as usize)
        .enumerate()
    {
        let time = start + Duration::seconds(offset_seconds as i64);
        let positions = propagate_all(propagators, time);

        let mut step_detections: Vec<CoarseDetection> = pairs
            .par_iter()
            .filter_map(|pair| {
                let pv_a = positions.get(&pair.a)?;
                let pv_b = positions.get(&pair.b)?;
                let distance = distance_km(pv_a, pv_b);
                (distance < tolerance_km).then(|| CoarseDetection {
                    pair: *pair,
                    time,
                    distance_km: distance,
                })
            })
            .collect();
        detections.append(&mut step_detections);

        if (step_count + 1) % log_interval == 0 {
            debug!(
                "Coarse sweep progress: {}% ({}/{} steps, {} detections)",
                (step_count + 1) * 100 / total_steps.max(1),
                step_count + 1,
                total_steps,
                detections.len()
            );
        }
    }

    debug!("Coarse sweep found {} detections", detections.len());
    detections
}
