use thiserror::Error;

use crate::firebase::ClientError;

/// Plugin-level error type covering every failure the host pipeline can see.
///
/// Configuration problems surface at configure time, before any network
/// activity; authentication and write failures surface as a failed
/// activation step, wrapping the client error that caused them.
#[derive(Error, Debug)]
pub enum PluginError {
    /// One or more required configuration keys are missing or empty
    #[error("Missing required configuration: {}", keys.join(", "))]
    Configuration { keys: Vec<String> },

    /// A configuration value resolved to an unusable type or shape
    #[error("Validation failed for {key}: {reason}")]
    Validation { key: String, reason: String },

    /// The authentication call against Firebase failed
    #[error("Firebase authentication failed")]
    Authentication {
        #[source]
        source: ClientError,
    },

    /// The release payload could not be written
    #[error("Failed to write release payload")]
    Write {
        #[source]
        source: ClientError,
    },
}

impl PluginError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(key: S, reason: S) -> Self {
        PluginError::Validation {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Type alias for Result with PluginError to simplify function signatures
pub type PluginResult<T> = Result<T, PluginError>;
