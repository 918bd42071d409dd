//! Billing engine errors

use crate::db::repository::RepoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    /// Session does not exist
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Session has never started — a reserved session cannot be billed
    #[error("Session {0} has no start time")]
    MissingStartTime(String),

    /// The optimistic write precondition failed and the session is not in a
    /// state whose stored bill could be returned instead
    #[error("Finalize conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}
