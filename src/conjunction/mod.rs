mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use store::{ConjunctionStore, Page, UpsertOutcome};

/// A refined close approach between two catalog objects.
///
/// `object1_norad_id < object2_norad_id` always holds, so one unordered pair
/// maps to exactly one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Conjunction {
    /// Assigned by the store on first insert.
    pub id: Option<u64>,
    pub object1_norad_id: u32,
    pub object2_norad_id: u32,
    pub miss_distance_km: f64,
    pub time_of_closest_approach: DateTime<Utc>,
    pub relative_velocity_m_s: f64,
}

impl Conjunction {
    pub fn pair_key(&self) -> (u32, u32) {
        (self.object1_norad_id, self.object2_norad_id)
    }
}
