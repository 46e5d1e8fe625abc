//! Error types for `quote_domain`.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("notification platform call `{operation}` failed: {message}")]
    Platform {
        operation: &'static str,
        message: String,
    },

    #[error("notification permission has not been granted")]
    PermissionDenied,

    #[error("no notification sink configured")]
    MissingSink,

    #[error("local time {0} does not exist in the current time zone")]
    UnresolvableLocalTime(NaiveDateTime),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn platform(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Platform {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
