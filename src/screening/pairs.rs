use log::debug;
use rayon::prelude::*;

use crate::catalog::Satellite;

/// Ordered catalog-number pair, `a < b`. Two pairs with the same unordered
/// members compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SatellitePair {
    pub a: u32,
    pub b: u32,
}

impl SatellitePair {
    pub fn new(x: u32, y: u32) -> Self {
        if x <= y {
            SatellitePair { a: x, b: y }
        } else {
            SatellitePair { a: y, b: x }
        }
    }
}

/// Geometric prefilter: keep only pairs whose orbital shells, inflated by
/// `tolerance_km` on each end, intersect as radial bands. Two orbits whose
/// altitude ranges stay further apart than the tolerance cannot approach.
pub fn reduce_pairs(satellites: &[Satellite], tolerance_km: f64) -> Vec<SatellitePair> {
    let pairs: Vec<SatellitePair> = satellites
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, sat_a)| {
            satellites[i + 1..]
                .iter()
                .filter(move |sat_b| shells_overlap(sat_a, sat_b, tolerance_km))
                .map(move |sat_b| SatellitePair::new(sat_a.norad_cat_id, sat_b.norad_cat_id))
        })
        .collect();

    debug!(
        "Pair reduction: {} satellites -> {} candidate pairs",
        satellites.len(),
        pairs.len()
    );
    pairs
}

fn shells_overlap(a: &Satellite, b: &Satellite, tolerance_km: f64) -> bool {
    a.perigee_alt_km.max(b.perigee_alt_km) - tolerance_km
        <= a.apogee_alt_km.min(b.apogee_alt_km) + tolerance_km
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn shell(cat_id: u32, perigee_alt_km: f64, apogee_alt_km: f64) -> Satellite {
        Satellite {
            norad_cat_id: cat_id,
            object_name: None,
            tle_line1: String::new(),
            tle_line2: String::new(),
            epoch: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            mean_motion: 15.0,
            eccentricity: 0.0,
            inclination_deg: 0.0,
            raan_deg: 0.0,
            arg_perigee_deg: 0.0,
            mean_anomaly_deg: 0.0,
            bstar: 0.0,
            perigee_alt_km,
            apogee_alt_km,
        }
    }

    #[test]
    fn disjoint_shells_are_omitted() {
        // 400 km circular vs 1200 km circular, 50 km tolerance: 800 km apart
        let sats = vec![shell(1, 400.0, 400.0), shell(2, 1200.0, 1200.0)];
        assert!(reduce_pairs(&sats, 50.0).is_empty());
    }

    #[test]
    fn overlap_within_tolerance_is_kept() {
        // 60 km gap closes once each endpoint is inflated by 50 km
        let sats = vec![shell(1, 400.0, 500.0), shell(2, 560.0, 700.0)];
        let pairs = reduce_pairs(&sats, 50.0);
        assert_eq!(pairs, vec![SatellitePair::new(1, 2)]);
    }

    #[test]
    fn gap_beyond_inflated_tolerance_is_dropped() {
        // 101 km gap survives 2 x 50 km inflation
        let sats = vec![shell(1, 400.0, 500.0), shell(2, 601.0, 700.0)];
        assert!(reduce_pairs(&sats, 50.0).is_empty());
    }

    #[test]
    fn output_is_unique_and_antireflexive() {
        let sats: Vec<Satellite> = (1..=5).map(|i| shell(i, 500.0, 600.0)).collect();
        let pairs = reduce_pairs(&sats, 10.0);

        assert_eq!(pairs.len(), 10); // C(5, 2)
        let unique: HashSet<SatellitePair> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), pairs.len());
        for pair in &pairs {
            assert!(pair.a < pair.b);
        }
    }

    #[test]
    fn pair_ordering_is_normalized() {
        assert_eq!(SatellitePair::new(9, 3), SatellitePair::new(3, 9));
        assert_eq!(SatellitePair::new(9, 3).a, 3);
    }

    #[test]
    fn eccentric_shell_spans_both_circular_orbits() {
        // 300 x 1300 km ellipse overlaps both a 400 km and a 1200 km shell
        let sats = vec![
            shell(1, 400.0, 400.0),
            shell(2, 1200.0, 1200.0),
            shell(3, 300.0, 1300.0),
        ];
        let pairs = reduce_pairs(&sats, 50.0);
        let set: HashSet<SatellitePair> = pairs.into_iter().collect();
        assert!(set.contains(&SatellitePair::new(1, 3)));
        assert!(set.contains(&SatellitePair::new(2, 3)));
        assert!(!set.contains(&SatellitePair::new(1, 2)));
    }
}
