use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth equatorial radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Geocentric gravitational parameter in km^3/s^2.
pub const EARTH_MU_KM3_S2: f64 = 398600.4418;

/// A catalog object, keyed by NORAD catalog number. The two TLE lines are
/// the canonical state; the mean elements and shell altitudes are derived
/// from them at ingest time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Satellite {
    pub norad_cat_id: u32,
    pub object_name: Option<String>,
    pub tle_line1: String,
    pub tle_line2: String,
    pub epoch: DateTime<Utc>,
    /// Revolutions per day.
    pub mean_motion: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub bstar: f64,
    /// Perigee height above [`EARTH_RADIUS_KM`], in km.
    pub perigee_alt_km: f64,
    /// Apogee height above [`EARTH_RADIUS_KM`], in km.
    pub apogee_alt_km: f64,
}

impl Satellite {
    /// Recompute the shell altitudes from mean motion and eccentricity.
    ///
    /// Semi-major axis from Kepler's third law; the altitudes are heights
    /// above the mean equatorial radius, so they can go negative for
    /// decaying objects.
    pub fn compute_derived(&mut self) {
        let n_rad_s = self.mean_motion * 2.0 * std::f64::consts::PI / 86400.0;
        let semi_major_km = (EARTH_MU_KM3_S2 / (n_rad_s * n_rad_s)).cbrt();
        self.perigee_alt_km = semi_major_km * (1.0 - self.eccentricity) - EARTH_RADIUS_KM;
        self.apogee_alt_km = semi_major_km * (1.0 + self.eccentricity) - EARTH_RADIUS_KM;
    }
}
