use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::pairs::SatellitePair;
use super::sweep::CoarseDetection;

/// One orbital encounter: a non-empty, time-sorted run of coarse detections
/// for a single pair, with no intra-run gap larger than three sweep steps.
#[derive(Debug, Clone)]
pub struct Event {
    pub pair: SatellitePair,
    pub detections: Vec<CoarseDetection>,
}

impl Event {
    pub fn start(&self) -> DateTime<Utc> {
        self.detections[0].time
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.detections[self.detections.len() - 1].time
    }

    /// The detection with the smallest sampled distance.
    pub fn best(&self) -> &CoarseDetection {
        self.detections
            .iter()
            .min_by(|x, y| x.distance_km.total_cmp(&y.distance_km))
            .expect("event is never empty")
    }
}

/// Group detections by pair and split each pair's time-sorted samples into
/// events wherever consecutive samples are more than `3 x step` apart.
///
/// One encounter yields several consecutive below-tolerance samples; a fresh
/// encounter orbits later opens a gap of minutes to hours. The 3x multiplier
/// tolerates a single dropped sample without splitting the encounter.
pub fn cluster_events(
    detections: Vec<CoarseDetection>,
    step_seconds: u32,
) -> HashMap<SatellitePair, Vec<Event>> {
    let mut by_pair: HashMap<SatellitePair, Vec<CoarseDetection>> = HashMap::new();
    for detection in detections {
        by_pair.entry(detection.pair).or_default().push(detection);
    }

    let gap_threshold_seconds = 3 * step_seconds as i64;

    by_pair
        .into_iter()
        .map(|(pair, mut samples)| {
            samples.sort_by_key(|d| d.time);
            (pair, split_by_time_gap(pair, samples, gap_threshold_seconds))
        })
        .collect()
}

fn split_by_time_gap(
    pair: SatellitePair,
    sorted: Vec<CoarseDetection>,
    gap_threshold_seconds: i64,
) -> Vec<Event> {
    let mut events = Vec::new();
    let mut current: Vec<CoarseDetection> = Vec::new();

    for detection in sorted {
        if let Some(previous) = current.last() {
            let gap = (detection.time - previous.time).num_seconds();
            if gap > gap_threshold_seconds {
                events.push(Event {
                    pair,
                    detections: std::mem::take(&mut current),
                });
            }
        }
        current.push(detection);
    }
    if !current.is_empty() {
        events.push(Event {
            pair,
            detections: current,
        });
    }

    events
}
