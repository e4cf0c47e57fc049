use std::result::Result as StdResult;

use thiserror::Error;

use crate::domain::ApplicationStatus;

/// Error type shared by the store, review, and configuration layers.
///
/// Field validation failures are not represented here: they stay local to the
/// wizard as a [`crate::wizard::ValidationErrorSet`].
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Application not found: {0}")]
    NotFound(String),
    #[error("Cannot {action} application `{id}` while it is {from}")]
    InvalidTransition {
        id: String,
        from: ApplicationStatus,
        action: &'static str,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, PortalError>;

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Storage(err.to_string())
    }
}
