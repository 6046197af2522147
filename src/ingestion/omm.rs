use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::catalog::Satellite;

/// One row of the upstream GP/OMM catalog. Space-Track delivers numeric
/// fields as JSON strings, so everything is optional and coerced on read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OmmRecord {
    #[serde(default, deserialize_with = "de_opt_u32")]
    pub norad_cat_id: Option<u32>,
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub mean_motion: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub eccentricity: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub inclination: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub ra_of_asc_node: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub arg_of_pericenter: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub mean_anomaly: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub bstar: Option<f64>,
    #[serde(default)]
    pub tle_line1: Option<String>,
    #[serde(default)]
    pub tle_line2: Option<String>,
}

impl OmmRecord {
    /// A record is usable only if it carries a catalog number, both TLE
    /// lines, an epoch, a mean motion, and an eccentricity.
    pub fn is_valid(&self) -> bool {
        self.norad_cat_id.is_some()
            && self.tle_line1.is_some()
            && self.tle_line2.is_some()
            && self.epoch_utc().is_some()
            && self.mean_motion.is_some()
            && self.eccentricity.is_some()
    }

    pub fn epoch_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.epoch.as_deref()?;
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Build the catalog entry, recomputing the derived shell altitudes.
    /// Returns `None` for invalid records.
    pub fn to_satellite(&self) -> Option<Satellite> {
        if !self.is_valid() {
            return None;
        }
        let mut sat = Satellite {
            norad_cat_id: self.norad_cat_id?,
            object_name: self.object_name.clone(),
            tle_line1: self.tle_line1.clone()?,
            tle_line2: self.tle_line2.clone()?,
            epoch: self.epoch_utc()?,
            mean_motion: self.mean_motion?,
            eccentricity: self.eccentricity?,
            inclination_deg: self.inclination.unwrap_or(0.0),
            raan_deg: self.ra_of_asc_node.unwrap_or(0.0),
            arg_perigee_deg: self.arg_of_pericenter.unwrap_or(0.0),
            mean_anomaly_deg: self.mean_anomaly.unwrap_or(0.0),
            bstar: self.bstar.unwrap_or(0.0),
            perigee_alt_km: 0.0,
            apogee_alt_km: 0.0,
        };
        sat.compute_derived();
        Some(sat)
    }
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(Some(n)),
        Raw::Text(s) => Ok(s.trim().parse().ok()),
        Raw::Null => Ok(None),
    }
}

fn de_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(Some(n)),
        Raw::Text(s) => Ok(s.trim().parse().ok()),
        Raw::Null => Ok(None),
    }
}
