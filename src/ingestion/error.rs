use thiserror::Error;

use crate::catalog::StoreError;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
