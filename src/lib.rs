//! Deploy-pipeline plugin that notifies a Firebase Realtime Database of a
//! release.
//!
//! After the host pipeline activates a release, the plugin authenticates
//! with a custom token and writes a small JSON payload (release identifier
//! and timestamp) to a configured database path. It owns no orchestration
//! and no persistence beyond that one write; outcomes are reported back to
//! the host as plain `Result`s.

pub mod config;
pub mod context;
pub mod error;
pub mod firebase;
pub mod plugin;

pub use config::{ConfigValue, PluginConfig};
pub use context::{CommandOptions, DeployContext, RevisionData};
pub use error::{PluginError, PluginResult};
pub use firebase::{ClientError, FirebaseClient, RestFirebaseClient};
pub use plugin::{DeployPlugin, NotifyPlugin};
