//! Plugin configuration: a map from option name to literal or derived value.
//!
//! Values are a tagged variant rather than duck-typed "maybe callable"
//! entries: a `Literal` holds a plain JSON value, a `Derived` holds a
//! function re-evaluated at every read (time-dependent defaults rely on
//! this), and the two client variants hold or lazily build the database
//! client handle. Resolution happens in exactly one place, `resolve` /
//! `resolve_client`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::DeployContext;
use crate::error::{PluginError, PluginResult};
use crate::firebase::FirebaseClient;

/// Derivation function for a lazily-computed config value.
///
/// Receives the deploy context and the owning config section so that one
/// option may resolve another (the default payload reads `revisionKey`).
pub type DeriveFn =
    Arc<dyn Fn(&DeployContext, &PluginConfig) -> PluginResult<Value> + Send + Sync>;

/// Derivation function for a lazily-constructed client handle
pub type ClientDeriveFn = Arc<
    dyn Fn(&DeployContext, &PluginConfig) -> PluginResult<Arc<dyn FirebaseClient>> + Send + Sync,
>;

/// One configuration entry.
#[derive(Clone)]
pub enum ConfigValue {
    /// A plain value, returned as-is on every read
    Literal(Value),
    /// A derivation invoked on every read, never at configure time
    Derived(DeriveFn),
    /// A pre-built client handle
    Client(Arc<dyn FirebaseClient>),
    /// A client constructor invoked when the handle is first needed
    ClientFactory(ClientDeriveFn),
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ConfigValue::Derived(_) => f.write_str("Derived(..)"),
            ConfigValue::Client(_) => f.write_str("Client(..)"),
            ConfigValue::ClientFactory(_) => f.write_str("ClientFactory(..)"),
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        ConfigValue::Literal(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Literal(Value::String(value))
    }
}

/// Configuration section for one plugin instance.
///
/// The host fills it from its config file; `configure` merges computed
/// defaults into it in place, so resolved configuration stays inspectable
/// by later pipeline stages.
#[derive(Default, Clone, Debug)]
pub struct PluginConfig {
    values: HashMap<String, ConfigValue>,
}

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert, convenient when building a section by hand
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Resolves a value-typed option.
    ///
    /// `Literal` entries are returned as-is; `Derived` entries are invoked
    /// now, so time-dependent defaults are computed fresh on every read.
    /// Returns `Ok(None)` when the key is absent.
    pub fn resolve(&self, key: &str, ctx: &DeployContext) -> PluginResult<Option<Value>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Literal(value)) => Ok(Some(value.clone())),
            Some(ConfigValue::Derived(derive)) => derive(ctx, self).map(Some),
            Some(ConfigValue::Client(_)) | Some(ConfigValue::ClientFactory(_)) => {
                Err(PluginError::validation(
                    key,
                    "expected a value, found a client handle",
                ))
            }
        }
    }

    /// Resolves an option expected to be a string.
    ///
    /// Absent keys and explicit nulls resolve to `None`; any other
    /// non-string value is a validation error.
    pub fn resolve_str(&self, key: &str, ctx: &DeployContext) -> PluginResult<Option<String>> {
        match self.resolve(key, ctx)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(PluginError::Validation {
                key: key.to_string(),
                reason: format!("expected a string, found {other}"),
            }),
        }
    }

    /// Resolves the client handle for this run.
    ///
    /// A `Client` entry is shared as-is; a `ClientFactory` entry is invoked
    /// now. Value-typed entries under the key are a validation error.
    pub fn resolve_client(
        &self,
        key: &str,
        ctx: &DeployContext,
    ) -> PluginResult<Option<Arc<dyn FirebaseClient>>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Client(client)) => Ok(Some(Arc::clone(client))),
            Some(ConfigValue::ClientFactory(derive)) => derive(ctx, self).map(Some),
            Some(ConfigValue::Literal(_)) | Some(ConfigValue::Derived(_)) => {
                Err(PluginError::validation(
                    key,
                    "expected a client handle, found a value",
                ))
            }
        }
    }

    /// Installs a default for `key` if the host did not configure it.
    ///
    /// Returns true when the default was installed (the caller logs the
    /// substitution; one log line per missing key).
    pub fn apply_default(&mut self, key: &str, default: ConfigValue) -> bool {
        if self.contains(key) {
            return false;
        }
        self.values.insert(key.to_string(), default);
        true
    }
}
