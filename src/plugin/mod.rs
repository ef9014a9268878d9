//! Deploy lifecycle contract and the Firebase notification plugin.
//!
//! The host pipeline drives plugins through the `DeployPlugin` trait:
//! `configure` runs once before any deploy step and `did_activate` runs
//! once after the release is activated. `NotifyPlugin` is the one
//! production plugin here: it merges computed defaults into its config
//! section, validates required keys, and on activation authenticates and
//! writes the release payload.

mod defaults;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::PluginConfig;
use crate::context::DeployContext;
use crate::error::{PluginError, PluginResult};

/// Options the host checks for presence before activation
const REQUIRED_CONFIG: [&str; 2] = ["app", "token"];

/// Options that receive a computed default when unset, in log order
const DEFAULTED_CONFIG: [&str; 4] = ["revisionKey", "payload", "path", "firebaseClient"];

/// Lifecycle contract the host pipeline invokes.
///
/// Trait that all deploy plugins must implement; the host registers trait
/// objects and calls the two hooks in order, once each per deploy run.
#[async_trait]
pub trait DeployPlugin: Send + Sync {
    /// Name of this plugin instance, keying its configuration section
    fn name(&self) -> &str;

    /// Validates configuration and merges computed defaults, before any
    /// deploy step runs. Never performs network I/O.
    fn configure(&self, ctx: &mut DeployContext) -> PluginResult<()>;

    /// Runs after the release has been activated
    async fn did_activate(&self, ctx: &DeployContext) -> PluginResult<()>;
}

/// Plugin that notifies a Firebase Realtime Database of an activated
/// release: one authentication call, one write, no retries.
pub struct NotifyPlugin {
    name: String,
}

impl NotifyPlugin {
    /// Creates the plugin under the given name; the host's config file
    /// addresses it by this name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// This plugin's configuration section; missing entirely counts as
    /// every required key missing
    fn section<'a>(&self, ctx: &'a DeployContext) -> PluginResult<&'a PluginConfig> {
        ctx.plugin_config(&self.name)
            .ok_or_else(|| PluginError::Configuration {
                keys: REQUIRED_CONFIG.iter().map(|k| k.to_string()).collect(),
            })
    }
}

impl Default for NotifyPlugin {
    fn default() -> Self {
        Self::new("notify-firebase")
    }
}

#[async_trait]
impl DeployPlugin for NotifyPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    /// Merges defaults into the shared config section (visible to later
    /// pipeline stages), then validates required keys. Fails with a
    /// `Configuration` error naming every missing key, always before any
    /// network activity.
    fn configure(&self, ctx: &mut DeployContext) -> PluginResult<()> {
        ctx.log("validating config", true);

        let mut installed = Vec::new();
        {
            let section = ctx.plugin_config_mut(&self.name);
            for key in DEFAULTED_CONFIG {
                // every recognized key has a default; unknown keys never
                // reach this loop
                if let Some(default) = defaults::default_for(key)
                    && section.apply_default(key, default)
                {
                    installed.push(key);
                }
            }
        }
        for key in installed {
            ctx.log(&format!("Missing config: {key}, using default"), true);
        }

        let section = self.section(ctx)?;
        let mut missing = Vec::new();
        for key in REQUIRED_CONFIG {
            match section.resolve_str(key, ctx)? {
                Some(value) if !value.is_empty() => {}
                _ => missing.push(key.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(PluginError::Configuration { keys: missing });
        }

        ctx.log("config ok", true);
        Ok(())
    }

    /// Authenticates, then writes the release payload, strictly in that
    /// order; the write is never attempted when authentication fails. A
    /// single attempt per deploy run — retry policy belongs to the host.
    async fn did_activate(&self, ctx: &DeployContext) -> PluginResult<()> {
        let section = self.section(ctx)?;

        // one client handle for both calls; the REST client carries its
        // auth state between them
        let client = section
            .resolve_client("firebaseClient", ctx)?
            .ok_or_else(|| PluginError::validation("firebaseClient", "no client configured"))?;

        let token = section
            .resolve_str("token", ctx)?
            .ok_or_else(|| PluginError::Configuration {
                keys: vec!["token".to_string()],
            })?;

        client
            .auth_with_custom_token(&token)
            .await
            .map_err(|source| PluginError::Authentication { source })?;

        let path = section
            .resolve_str("path", ctx)?
            .unwrap_or_else(|| "release".to_string());
        // payload is evaluated now, not at configure time
        let payload = section.resolve("payload", ctx)?.unwrap_or(Value::Null);

        client
            .set(&path, &payload)
            .await
            .map_err(|source| PluginError::Write { source })?;

        ctx.log("notified Firebase of release", true);
        Ok(())
    }
}
