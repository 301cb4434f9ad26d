use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

/// Failure of a sync request. Wraps the underlying error unchanged.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl SyncError {
    pub fn as_remote(&self) -> Option<&ApiError> {
        match self {
            SyncError::Remote(e) => Some(e),
            SyncError::Storage(_) => None,
        }
    }
}
