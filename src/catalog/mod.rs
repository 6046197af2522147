mod satellite;
mod store;

pub use satellite::{Satellite, EARTH_MU_KM3_S2, EARTH_RADIUS_KM};
pub use store::{CatalogStore, StoreError};
