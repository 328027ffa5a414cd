use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors surfaced by the resource stores.
///
/// Only `create`, `fetch_one` and `fetch_details` return these to the caller;
/// the other operations record them in the store status instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;
