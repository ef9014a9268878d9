//! Core database client trait and error type.

use async_trait::async_trait;
use thiserror::Error;

/// Error produced by a database client call.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be performed at the transport level
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The database rejected the request
    #[error("Firebase rejected the request: {status} {body}")]
    Rejected { status: u16, body: String },

    /// A write was attempted before authentication completed
    #[error("Not authenticated")]
    Unauthenticated,

    /// Any other underlying cause (host-supplied clients, test doubles)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Trait for Firebase Realtime Database clients.
///
/// Uses `async_trait` to support async methods with dynamic dispatch; one
/// client handle lives for exactly one deploy run. Authentication must
/// complete before `set` is invoked — implementations may rely on that
/// ordering to carry credentials between the two calls.
#[async_trait]
pub trait FirebaseClient: Send + Sync {
    /// Authenticates against the database with a custom token
    async fn auth_with_custom_token(&self, token: &str) -> Result<(), ClientError>;

    /// Writes `value` at `path` within the database
    async fn set(&self, path: &str, value: &serde_json::Value) -> Result<(), ClientError>;
}
