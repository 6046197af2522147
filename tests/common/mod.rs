//! Shared scaffolding for the end-to-end screening scenarios: synthetic TLE
//! construction and throwaway file-backed stores.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use conjscan::catalog::{CatalogStore, Satellite, EARTH_MU_KM3_S2, EARTH_RADIUS_KM};
use conjscan::conjunction::ConjunctionStore;
use conjscan::screening::{Screener, ScreeningConfig};

/// All synthetic element sets are issued at this instant, so tests can start
/// their screening windows right at the TLE epoch.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

/// Modulo-10 TLE line checksum: digits count as themselves, minus signs as 1.
pub fn tle_checksum(line: &str) -> u32 {
    line.chars()
        .map(|c| match c {
            '-' => 1,
            c if c.is_ascii_digit() => c.to_digit(10).unwrap(),
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// Build a checksummed TLE pair for the 2020-01-01T00:00:00Z epoch with no
/// drag and the given mean elements.
pub fn synthetic_tle(
    norad: u32,
    inclination_deg: f64,
    raan_deg: f64,
    eccentricity: f64,
    arg_perigee_deg: f64,
    mean_anomaly_deg: f64,
    mean_motion_rev_day: f64,
) -> (String, String) {
    let line1 = format!(
        "1 {:05}U 98067A   20001.00000000  .00000000  00000-0  00000-0 0  999",
        norad
    );
    let line1 = format!("{}{}", line1, tle_checksum(&line1));

    let line2 = format!(
        "2 {:05} {:8.4} {:8.4} {:07} {:8.4} {:8.4} {:11.8}{:5}",
        norad,
        inclination_deg,
        raan_deg,
        (eccentricity * 1e7).round() as u32,
        arg_perigee_deg,
        mean_anomaly_deg,
        mean_motion_rev_day,
        1
    );
    let line2 = format!("{}{}", line2, tle_checksum(&line2));

    (line1, line2)
}

/// Mean motion in rev/day of a circular orbit at the given altitude.
pub fn circular_mean_motion(altitude_km: f64) -> f64 {
    let semi_major_km = EARTH_RADIUS_KM + altitude_km;
    let period_s = 2.0 * std::f64::consts::PI * (semi_major_km.powi(3) / EARTH_MU_KM3_S2).sqrt();
    86400.0 / period_s
}

/// A near-circular catalog entry with a freshly built TLE.
pub fn circular_satellite(
    norad: u32,
    altitude_km: f64,
    inclination_deg: f64,
    raan_deg: f64,
    mean_anomaly_deg: f64,
) -> Satellite {
    let mean_motion = circular_mean_motion(altitude_km);
    let eccentricity = 0.0001;
    let (tle_line1, tle_line2) = synthetic_tle(
        norad,
        inclination_deg,
        raan_deg,
        eccentricity,
        0.0,
        mean_anomaly_deg,
        mean_motion,
    );

    let mut sat = Satellite {
        norad_cat_id: norad,
        object_name: Some(format!("TEST OBJECT {}", norad)),
        tle_line1,
        tle_line2,
        epoch: epoch(),
        mean_motion,
        eccentricity,
        inclination_deg,
        raan_deg,
        arg_perigee_deg: 0.0,
        mean_anomaly_deg,
        bstar: 0.0,
        perigee_alt_km: 0.0,
        apogee_alt_km: 0.0,
    };
    sat.compute_derived();
    sat
}

pub struct TestEnv {
    pub dir: PathBuf,
    pub catalog: Arc<CatalogStore>,
    pub conjunctions: Arc<ConjunctionStore>,
}

impl TestEnv {
    pub fn screener(&self, config: ScreeningConfig) -> Screener {
        Screener::new(self.catalog.clone(), self.conjunctions.clone(), config)
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub fn test_env() -> TestEnv {
    let dir = std::env::temp_dir().join(format!("conjscan-e2e-{}", uuid::Uuid::new_v4()));
    let catalog = Arc::new(CatalogStore::open(&dir).unwrap());
    let conjunctions = Arc::new(ConjunctionStore::open(&dir).unwrap());
    TestEnv {
        dir,
        catalog,
        conjunctions,
    }
}
