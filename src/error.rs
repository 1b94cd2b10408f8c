use chrono::NaiveDateTime;
use thiserror::Error;

use crate::model::UserId;
use crate::pairing::ValidationError;

#[derive(Error, Debug)]
pub enum GiftError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Submissions closed at {cutoff} UTC")]
    SubmissionClosed { cutoff: NaiveDateTime },

    #[error("Unknown user {0}")]
    UnknownUser(UserId),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("A user named {0} already exists")]
    NameTaken(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

#[cfg(feature = "ssr")]
impl From<diesel::result::Error> for GiftError {
    fn from(e: diesel::result::Error) -> Self {
        GiftError::PersistenceFailure(e.to_string())
    }
}

#[cfg(feature = "ssr")]
impl From<diesel::r2d2::PoolError> for GiftError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        GiftError::PersistenceFailure(e.to_string())
    }
}

#[cfg(feature = "ssr")]
impl From<serde_json::Error> for GiftError {
    fn from(e: serde_json::Error) -> Self {
        GiftError::PersistenceFailure(e.to_string())
    }
}
