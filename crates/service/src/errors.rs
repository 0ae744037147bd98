use thiserror::Error;

use crate::storage::table::StoreError;
use models::errors::ModelError;

/// Domain error vocabulary for user operations. Callers branch on the kind,
/// never on message text.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("user already exists")]
    AlreadyExists,
    #[error("user does not exist")]
    NotFound,
    #[error("failed to fetch record")]
    Fetch(#[source] StoreError),
    #[error("could not put item")]
    Write(#[source] StoreError),
    #[error("could not delete item")]
    Delete(#[source] StoreError),
}
