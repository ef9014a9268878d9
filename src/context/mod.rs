//! Per-deploy-run context handed to lifecycle hooks.
//!
//! The context is owned by the host pipeline: it carries command-line
//! options, outputs of earlier pipeline stages, the per-plugin
//! configuration sections, and the logger. Plugins read it and only mutate
//! it by merging resolved defaults into their own configuration section
//! during `configure`.

pub mod logger;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PluginConfig;
use crate::firebase::FirebaseClient;
use logger::{DeployLogger, TracingLogger};

/// Constructor for a database client, keyed by database URL.
///
/// Hosts and tests supply one to substitute the production client without
/// touching production wiring.
pub type ClientFactory = Arc<dyn Fn(&str) -> Arc<dyn FirebaseClient> + Send + Sync>;

/// Command-line options forwarded by the host for this deploy run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandOptions {
    /// Explicit revision passed on the command line, if any
    pub revision: Option<String>,
}

/// Output of an earlier pipeline stage describing the release being deployed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionData {
    /// Identifier of the revision being activated
    pub revision_key: String,
}

/// Deploy-run context passed to `configure` and `did_activate`.
///
/// One context per deploy run; nothing in it is shared across runs.
#[derive(Clone)]
pub struct DeployContext {
    pub project_name: String,
    pub command_options: CommandOptions,
    pub revision_data: Option<RevisionData>,
    /// Per-plugin configuration sections, keyed by plugin name
    pub config: HashMap<String, PluginConfig>,
    pub logger: Arc<dyn DeployLogger>,
    /// Test-injectable client constructor; falls back to the production
    /// REST client when absent
    pub client_factory: Option<ClientFactory>,
}

impl DeployContext {
    /// Creates a context that logs through `tracing`
    pub fn new(project_name: impl Into<String>) -> Self {
        Self::with_logger(project_name, Arc::new(TracingLogger))
    }

    /// Creates a context with an explicit logger (hosts pass their own)
    pub fn with_logger(project_name: impl Into<String>, logger: Arc<dyn DeployLogger>) -> Self {
        Self {
            project_name: project_name.into(),
            command_options: CommandOptions::default(),
            revision_data: None,
            config: HashMap::new(),
            logger,
            client_factory: None,
        }
    }

    /// Configuration section for one plugin, if present
    pub fn plugin_config(&self, plugin_name: &str) -> Option<&PluginConfig> {
        self.config.get(plugin_name)
    }

    /// Configuration section for one plugin, created empty on first access
    pub fn plugin_config_mut(&mut self, plugin_name: &str) -> &mut PluginConfig {
        self.config.entry(plugin_name.to_string()).or_default()
    }

    /// Emits a log line through the host's logger
    pub fn log(&self, message: &str, verbose: bool) {
        self.logger.log(message, verbose);
    }
}
