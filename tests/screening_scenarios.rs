//! End-to-end screening scenarios over synthetic two-satellite catalogs:
//! build TLEs with known geometry, run the pipeline (piecewise and through
//! the orchestrator), and check the emitted conjunctions.

mod common;

use chrono::Duration;

use common::{circular_satellite, epoch, test_env};
use conjscan::catalog::Satellite;
use conjscan::screening::{
    build_propagators, cluster_events, coarse_sweep, reduce_pairs, refine_event, Event,
    Propagator, SatellitePair, ScreeningConfig,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(tolerance_km: f64, step_seconds: u32, lookahead_hours: u32) -> ScreeningConfig {
    ScreeningConfig {
        tolerance_km,
        threshold_km: 5.0,
        lookahead_hours,
        step_seconds,
    }
}

/// The synthetic TLEs must produce physically sensible states, otherwise
/// every scenario below is meaningless.
#[test]
fn synthetic_tle_propagates_to_orbital_radius() {
    init_logging();
    let sat = circular_satellite(9001, 500.0, 51.6, 0.0, 0.0);
    let propagator = Propagator::from_satellite(&sat).unwrap();

    let pv = propagator.pv(epoch()).unwrap();
    let radius_km = (pv.position_m[0].powi(2) + pv.position_m[1].powi(2)
        + pv.position_m[2].powi(2))
    .sqrt()
        / 1000.0;
    let speed_km_s = (pv.velocity_m_s[0].powi(2)
        + pv.velocity_m_s[1].powi(2)
        + pv.velocity_m_s[2].powi(2))
    .sqrt()
        / 1000.0;

    assert!(
        (radius_km - 6878.0).abs() < 30.0,
        "unexpected radius {radius_km} km"
    );
    assert!(
        (speed_km_s - 7.6).abs() < 0.2,
        "unexpected speed {speed_km_s} km/s"
    );
}

/// Two satellites on the same 500 km circular orbit, mean anomaly offset by
/// 0.1 deg: a constant ~12 km along-track separation. Every refined approach
/// stays under 15 km but over the 5 km threshold, so nothing is persisted.
#[test]
fn trailing_pair_stays_above_threshold() {
    init_logging();
    let env = test_env();
    env.catalog
        .save_all(vec![
            circular_satellite(1001, 500.0, 51.6, 0.0, 0.0),
            circular_satellite(1002, 500.0, 51.6, 0.0, 0.1),
        ])
        .unwrap();

    let satellites = env.catalog.all();
    let pairs = reduce_pairs(&satellites, 50.0);
    assert_eq!(pairs, vec![SatellitePair::new(1001, 1002)]);

    let propagators = build_propagators(&satellites);
    assert_eq!(propagators.len(), 2);

    let detections = coarse_sweep(&pairs, &propagators, epoch(), 50.0, 10, 1);
    // The separation never leaves the tolerance, so every sample of the
    // inclusive one-hour grid must be a detection
    assert_eq!(detections.len(), 361);

    let events: Vec<Event> = cluster_events(detections, 10).into_values().flatten().collect();
    assert!(!events.is_empty());

    for event in &events {
        let candidate = refine_event(event, &propagators, 10).unwrap();
        assert!(
            candidate.miss_distance_km > 5.0 && candidate.miss_distance_km < 15.0,
            "unexpected miss distance {} km",
            candidate.miss_distance_km
        );
        // The refined minimum can only improve on the sampled minimum
        assert!(candidate.miss_distance_km <= event.best().distance_km + 1e-6);
    }

    // Above threshold: the orchestrator must not write anything
    let report = env.screener(config(50.0, 10, 1)).run(epoch()).unwrap();
    assert_eq!(report.conjunctions, 0);
    assert_eq!(env.conjunctions.count(), 0);
}

/// Counter-rotating coplanar orbits at 400 km crossing head-on at the node:
/// one very close approach with a relative speed of roughly twice orbital
/// velocity.
#[test]
fn head_on_pass_produces_conjunction() {
    init_logging();
    let env = test_env();
    env.catalog
        .save_all(vec![
            circular_satellite(2001, 400.0, 51.6, 0.0, 0.0),
            circular_satellite(2002, 400.0, 128.4, 180.0, 180.0),
        ])
        .unwrap();

    let report = env.screener(config(50.0, 5, 1)).run(epoch()).unwrap();
    assert!(report.detections > 0);
    assert_eq!(report.conjunctions, 1);

    let stored = env.conjunctions.all();
    assert_eq!(stored.len(), 1);
    let conjunction = &stored[0];
    assert_eq!(conjunction.object1_norad_id, 2001);
    assert_eq!(conjunction.object2_norad_id, 2002);
    assert!(
        conjunction.miss_distance_km < 5.0,
        "miss distance {} km not below threshold",
        conjunction.miss_distance_km
    );
    assert!(
        conjunction.relative_velocity_m_s > 14_500.0
            && conjunction.relative_velocity_m_s < 15_500.0,
        "relative speed {} m/s outside head-on band",
        conjunction.relative_velocity_m_s
    );
    assert!(conjunction.time_of_closest_approach >= epoch() - Duration::seconds(5));
    assert!(conjunction.time_of_closest_approach <= epoch() + Duration::hours(1));
}

/// 400 km vs 1200 km circular shells: the reducer must drop the pair, and
/// even a force-fed pair yields no coarse detections.
#[test]
fn far_apart_shells_are_filtered() {
    init_logging();
    let satellites = vec![
        circular_satellite(3001, 400.0, 51.6, 0.0, 0.0),
        circular_satellite(3002, 1200.0, 51.6, 0.0, 0.0),
    ];

    assert!(reduce_pairs(&satellites, 50.0).is_empty());

    let propagators = build_propagators(&satellites);
    let forced = vec![SatellitePair::new(3001, 3002)];
    let detections = coarse_sweep(&forced, &propagators, epoch(), 50.0, 30, 1);
    assert!(detections.is_empty());
}

/// A hyperbolic element set in the catalog is skipped by the propagator
/// cache and never shows up in results.
#[test]
fn decayed_satellite_is_skipped() {
    init_logging();
    let env = test_env();

    let mut decayed = circular_satellite(4003, 400.0, 51.6, 90.0, 0.0);
    decayed.eccentricity = 1.01;

    let satellites = vec![
        circular_satellite(2001, 400.0, 51.6, 0.0, 0.0),
        circular_satellite(2002, 400.0, 128.4, 180.0, 180.0),
        decayed,
    ];
    env.catalog.save_all(satellites.clone()).unwrap();

    let propagators = build_propagators(&satellites);
    assert_eq!(propagators.len(), 2);
    assert!(!propagators.contains_key(&4003));

    let report = env.screener(config(50.0, 5, 1)).run(epoch()).unwrap();
    assert!(report.conjunctions >= 1);
    for conjunction in env.conjunctions.all() {
        assert_ne!(conjunction.object1_norad_id, 4003);
        assert_ne!(conjunction.object2_norad_id, 4003);
    }
}

/// An empty catalog runs to completion with all-zero counts.
#[test]
fn empty_catalog_returns_cleanly() {
    init_logging();
    let env = test_env();

    let report = env.screener(config(50.0, 5, 1)).run(epoch()).unwrap();
    assert_eq!(report.satellites, 0);
    assert_eq!(report.candidate_pairs, 0);
    assert_eq!(report.detections, 0);
    assert_eq!(report.events, 0);
    assert_eq!(report.conjunctions, 0);
    assert_eq!(env.conjunctions.count(), 0);
}

/// Re-running on unchanged inputs and a fixed start reports the same
/// conjunction set and mutates nothing in the store.
#[test]
fn rerun_is_idempotent() {
    init_logging();
    let env = test_env();
    env.catalog
        .save_all(vec![
            circular_satellite(2001, 400.0, 51.6, 0.0, 0.0),
            circular_satellite(2002, 400.0, 128.4, 180.0, 180.0),
        ])
        .unwrap();

    let screener = env.screener(config(50.0, 5, 1));

    let first = screener.run(epoch()).unwrap();
    let mut rows_after_first = env.conjunctions.all();
    rows_after_first.sort_by_key(|c| c.pair_key());

    let second = screener.run(epoch()).unwrap();
    let mut rows_after_second = env.conjunctions.all();
    rows_after_second.sort_by_key(|c| c.pair_key());

    assert_eq!(first.conjunctions, second.conjunctions);
    assert_eq!(rows_after_first.len(), rows_after_second.len());
    for (before, after) in rows_after_first.iter().zip(rows_after_second.iter()) {
        assert_eq!(before.pair_key(), after.pair_key());
        assert_eq!(before.miss_distance_km, after.miss_distance_km);
        assert_eq!(before.time_of_closest_approach, after.time_of_closest_approach);
        assert_eq!(before.id, after.id);
    }
}

/// Satellites whose TLE lines fail to parse are counted out of the cache
/// but leave the rest of the catalog usable.
#[test]
fn corrupt_tle_is_skipped() {
    init_logging();
    let mut corrupt = circular_satellite(5001, 500.0, 51.6, 0.0, 0.0);
    corrupt.tle_line1 = "1 garbage".to_string();

    let satellites: Vec<Satellite> =
        vec![corrupt, circular_satellite(5002, 500.0, 51.6, 0.0, 0.0)];
    let propagators = build_propagators(&satellites);
    assert_eq!(propagators.len(), 1);
    assert!(propagators.contains_key(&5002));
}
