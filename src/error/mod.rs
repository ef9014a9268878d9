mod plugin_error;

pub use plugin_error::{PluginError, PluginResult};
