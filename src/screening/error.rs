use thiserror::Error;

use crate::catalog::StoreError;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("invalid tle: {0}")]
    InvalidTle(#[from] sgp4::TleError),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<sgp4::Error> for ScreeningError {
    fn from(err: sgp4::Error) -> Self {
        ScreeningError::Propagation(err.to_string())
    }
}
