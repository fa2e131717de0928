//! Session errors.

use thiserror::Error;
use tickflow_runtime::StoreError;

/// Errors surfaced by a [`Session`](crate::scheduler::Session)
///
/// Malformed or missing stored values are not errors; they degrade to a
/// baseline of zero.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The underlying store rejected an action or timed out shutting down
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// `run` was called on a session that already ran
    #[error("Session already started")]
    AlreadyStarted,
}
