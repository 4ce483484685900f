//! Service-level errors shared by the background components.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A periodic task could not be scheduled. The caller has already been
    /// stopped when this is returned.
    #[error("failed to schedule '{task}': {reason}")]
    Scheduling { task: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
