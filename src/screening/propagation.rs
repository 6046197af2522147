use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use log::info;
use rayon::prelude::*;
use sgp4::{Constants, Elements};

use crate::catalog::Satellite;

use super::error::ScreeningError;
use super::pairs::SatellitePair;

/// Inertial (TEME) position and velocity of one object at one instant.
#[derive(Debug, Clone, Copy)]
pub struct PvCoordinates {
    pub position_m: [f64; 3],
    pub velocity_m_s: [f64; 3],
}

/// One SGP4/SDP4 propagator, bound to the element set epoch of its TLE.
pub struct Propagator {
    epoch: DateTime<Utc>,
    constants: Constants,
}

impl Propagator {
    pub fn from_satellite(sat: &Satellite) -> Result<Self, ScreeningError> {
        let elements = Elements::from_tle(
            sat.object_name.clone(),
            sat.tle_line1.as_bytes(),
            sat.tle_line2.as_bytes(),
        )?;
        let constants = Constants::from_elements(&elements)?;
        Ok(Propagator {
            epoch: Utc.from_utc_datetime(&elements.datetime),
            constants,
        })
    }

    /// Position and velocity at `t`, in metres and m/s.
    pub fn pv(&self, t: DateTime<Utc>) -> Result<PvCoordinates, ScreeningError> {
        let minutes = (t - self.epoch).num_milliseconds() as f64 / 60_000.0;
        let prediction = self.constants.propagate(sgp4::MinutesSinceEpoch(minutes))?;
        Ok(PvCoordinates {
            position_m: prediction.position.map(|km| km * 1000.0),
            velocity_m_s: prediction.velocity.map(|km_s| km_s * 1000.0),
        })
    }
}

/// Build one propagator per satellite. Hyperbolic element sets and TLEs the
/// parser rejects are skipped; the skipped count is logged.
pub fn build_propagators(satellites: &[Satellite]) -> HashMap<u32, Propagator> {
    let mut propagators = HashMap::with_capacity(satellites.len());
    let mut skipped = 0usize;

    for sat in satellites {
        if !sat.eccentricity.is_finite() || sat.eccentricity >= 1.0 {
            skipped += 1;
            continue;
        }
        match Propagator::from_satellite(sat) {
            Ok(propagator) => {
                propagators.insert(sat.norad_cat_id, propagator);
            }
            Err(_) => skipped += 1,
        }
    }

    info!(
        "Built {} propagators ({} satellites skipped)",
        propagators.len(),
        skipped
    );
    propagators
}

/// Propagate the whole cache to `t` in parallel. Objects that fail to
/// propagate (numerical blow-up, epoch too far) are absent from the snapshot.
pub fn propagate_all(
    propagators: &HashMap<u32, Propagator>,
    t: DateTime<Utc>,
) -> HashMap<u32, PvCoordinates> {
    propagators
        .par_iter()
        .filter_map(|(cat_id, propagator)| propagator.pv(t).ok().map(|pv| (*cat_id, pv)))
        .collect()
}

/// Euclidean separation in kilometres. Components are converted to km
/// before subtraction to keep the arithmetic in a comfortable range.
pub fn distance_km(a: &PvCoordinates, b: &PvCoordinates) -> f64 {
    let dx = (a.position_m[0] - b.position_m[0]) / 1000.0;
    let dy = (a.position_m[1] - b.position_m[1]) / 1000.0;
    let dz = (a.position_m[2] - b.position_m[2]) / 1000.0;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Relative velocity magnitude in m/s.
pub fn relative_speed_m_s(a: &PvCoordinates, b: &PvCoordinates) -> f64 {
    let dvx = a.velocity_m_s[0] - b.velocity_m_s[0];
    let dvy = a.velocity_m_s[1] - b.velocity_m_s[1];
    let dvz = a.velocity_m_s[2] - b.velocity_m_s[2];
    (dvx * dvx + dvy * dvy + dvz * dvz).sqrt()
}

/// Distance between both members of a pair at `t`, as a minimizer probe.
/// Any failure (missing propagator, propagation error) evaluates to +inf so
/// the minimizer walks away from that instant.
pub fn probe_pair_distance_km(
    pair: SatellitePair,
    propagators: &HashMap<u32, Propagator>,
    t: DateTime<Utc>,
) -> f64 {
    let (Some(prop_a), Some(prop_b)) = (propagators.get(&pair.a), propagators.get(&pair.b)) else {
        return f64::INFINITY;
    };
    match (prop_a.pv(t), prop_b.pv(t)) {
        (Ok(pv_a), Ok(pv_b)) => distance_km(&pv_a, &pv_b),
        _ => f64::INFINITY,
    }
}

/// Relative speed of a pair at `t`, or `None` if either propagation fails.
pub fn probe_pair_speed_m_s(
    pair: SatellitePair,
    propagators: &HashMap<u32, Propagator>,
    t: DateTime<Utc>,
) -> Option<f64> {
    let prop_a = propagators.get(&pair.a)?;
    let prop_b = propagators.get(&pair.b)?;
    let pv_a = prop_a.pv(t).ok()?;
    let pv_b = prop_b.pv(t).ok()?;
    Some(relative_speed_m_s(&pv_a, &pv_b))
}
