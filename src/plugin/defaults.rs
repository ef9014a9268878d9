//! Computed defaults for unset configuration options.
//!
//! Every default except `path` is installed lazily: the stored entry is a
//! derivation invoked at read time, so the payload timestamp is fresh and
//! the revision key tracks whatever the context holds when it is read.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::ConfigValue;
use crate::error::PluginError;
use crate::firebase::RestFirebaseClient;

/// Default for a recognized option name, if one exists
pub(super) fn default_for(key: &str) -> Option<ConfigValue> {
    match key {
        "path" => Some(path()),
        "payload" => Some(payload()),
        "revisionKey" => Some(revision_key()),
        "firebaseClient" => Some(firebase_client()),
        _ => None,
    }
}

/// `path` is the one plain-value default: the release marker location
fn path() -> ConfigValue {
    ConfigValue::from("release")
}

/// `{ "release": <revisionKey>, "at": <epoch ms> }`, computed at read time
fn payload() -> ConfigValue {
    ConfigValue::Derived(Arc::new(|ctx, config| {
        let release = config.resolve("revisionKey", ctx)?.unwrap_or(Value::Null);
        let at = jiff::Timestamp::now().as_millisecond();
        Ok(json!({ "release": release, "at": at }))
    }))
}

/// Command-line revision takes precedence over the pipeline's revision
/// data; with neither present the key resolves to null and is written into
/// the payload as-is.
fn revision_key() -> ConfigValue {
    ConfigValue::Derived(Arc::new(|ctx, _config| {
        if let Some(revision) = &ctx.command_options.revision {
            return Ok(json!(revision));
        }
        if let Some(data) = &ctx.revision_data {
            return Ok(json!(data.revision_key));
        }
        Ok(Value::Null)
    }))
}

/// Builds the database client from the resolved `app`, honoring a
/// test-injectable constructor on the context when one is supplied.
fn firebase_client() -> ConfigValue {
    ConfigValue::ClientFactory(Arc::new(|ctx, config| {
        let app = config
            .resolve_str("app", ctx)?
            .ok_or_else(|| PluginError::Configuration {
                keys: vec!["app".to_string()],
            })?;
        let url = format!("https://{app}.firebaseio.com");

        if let Some(factory) = &ctx.client_factory {
            return Ok(factory(&url));
        }

        let client = RestFirebaseClient::new(&url).map_err(|e| PluginError::Validation {
            key: "firebaseClient".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Arc::new(client))
    }))
}
