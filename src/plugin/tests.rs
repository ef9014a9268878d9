//! Tests for the notification plugin lifecycle.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::config::PluginConfig;
use crate::context::logger::RecordingLogger;
use crate::context::{ClientFactory, CommandOptions, DeployContext, RevisionData};
use crate::error::PluginError;
use crate::firebase::{ClientError, FirebaseClient};
use crate::plugin::{DeployPlugin, NotifyPlugin};

/// Database client double that records every call
#[derive(Default)]
struct MockFirebase {
    fail_auth: bool,
    fail_set: bool,
    auth_tokens: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, Value)>>,
}

impl MockFirebase {
    fn auth_tokens(&self) -> Vec<String> {
        self.auth_tokens.lock().unwrap().clone()
    }

    fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FirebaseClient for MockFirebase {
    async fn auth_with_custom_token(&self, token: &str) -> Result<(), ClientError> {
        self.auth_tokens.lock().unwrap().push(token.to_string());
        if self.fail_auth {
            return Err(ClientError::Other(anyhow::anyhow!(
                "Failed to authenticate"
            )));
        }
        Ok(())
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), ClientError> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_string(), value.clone()));
        if self.fail_set {
            return Err(ClientError::Other(anyhow::anyhow!("Can't write here")));
        }
        Ok(())
    }
}

/// Factory injecting `mock` regardless of URL, recording the URLs asked for
fn factory_for(mock: Arc<MockFirebase>, urls: Arc<Mutex<Vec<String>>>) -> ClientFactory {
    Arc::new(move |url| {
        urls.lock().unwrap().push(url.to_string());
        Arc::clone(&mock) as Arc<dyn FirebaseClient>
    })
}

struct Harness {
    plugin: NotifyPlugin,
    ctx: DeployContext,
    logger: Arc<RecordingLogger>,
    mock: Arc<MockFirebase>,
    urls: Arc<Mutex<Vec<String>>>,
}

fn harness(config: PluginConfig, mock: MockFirebase) -> Harness {
    let logger = Arc::new(RecordingLogger::new());
    let mock = Arc::new(mock);
    let urls = Arc::new(Mutex::new(Vec::new()));

    let mut ctx = DeployContext::with_logger("my-project", logger.clone());
    ctx.config.insert("notify-firebase".to_string(), config);
    ctx.client_factory = Some(factory_for(mock.clone(), urls.clone()));

    Harness {
        plugin: NotifyPlugin::new("notify-firebase"),
        ctx,
        logger,
        mock,
        urls,
    }
}

fn minimal_config() -> PluginConfig {
    PluginConfig::new()
        .with("app", "some-app")
        .with("token", "super-secret-token")
}

#[test]
fn test_plugin_reports_its_name() {
    let plugin = NotifyPlugin::new("test-plugin");
    assert_eq!(plugin.name(), "test-plugin");

    assert_eq!(NotifyPlugin::default().name(), "notify-firebase");
}

#[test]
fn test_configure_succeeds_with_app_and_token() {
    let mut h = harness(minimal_config(), MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();

    let messages = h.logger.messages();
    assert!(messages.contains(&"validating config".to_string()));
    assert!(messages.contains(&"config ok".to_string()));
}

#[test]
fn test_explicit_revision_key_wins_over_everything() {
    let config = minimal_config().with("revisionKey", "12345");
    let mut h = harness(config, MockFirebase::default());
    h.ctx.command_options = CommandOptions {
        revision: Some("abcd".to_string()),
    };
    h.ctx.revision_data = Some(RevisionData {
        revision_key: "something-else".to_string(),
    });

    h.plugin.configure(&mut h.ctx).unwrap();

    let section = h.ctx.plugin_config("notify-firebase").unwrap();
    assert_eq!(
        section.resolve("revisionKey", &h.ctx).unwrap(),
        Some(json!("12345"))
    );
}

#[test]
fn test_command_option_revision_wins_over_revision_data() {
    let mut h = harness(minimal_config(), MockFirebase::default());
    h.ctx.command_options = CommandOptions {
        revision: Some("abcd".to_string()),
    };
    h.ctx.revision_data = Some(RevisionData {
        revision_key: "something-else".to_string(),
    });

    h.plugin.configure(&mut h.ctx).unwrap();

    let section = h.ctx.plugin_config("notify-firebase").unwrap();
    assert_eq!(
        section.resolve("revisionKey", &h.ctx).unwrap(),
        Some(json!("abcd"))
    );
}

#[test]
fn test_revision_data_used_without_command_option() {
    let mut h = harness(minimal_config(), MockFirebase::default());
    h.ctx.revision_data = Some(RevisionData {
        revision_key: "something-else".to_string(),
    });

    h.plugin.configure(&mut h.ctx).unwrap();

    let section = h.ctx.plugin_config("notify-firebase").unwrap();
    assert_eq!(
        section.resolve("revisionKey", &h.ctx).unwrap(),
        Some(json!("something-else"))
    );
}

#[test]
fn test_revision_key_resolves_to_null_without_sources() {
    let mut h = harness(minimal_config(), MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();

    let section = h.ctx.plugin_config("notify-firebase").unwrap();
    assert_eq!(
        section.resolve("revisionKey", &h.ctx).unwrap(),
        Some(Value::Null)
    );
}

#[test]
fn test_missing_optional_config_logs_one_line_each() {
    // no config at all: the four optional keys each get a default and one
    // log line, then the required-key check fails
    let mut h = harness(PluginConfig::new(), MockFirebase::default());

    let err = h.plugin.configure(&mut h.ctx).unwrap_err();

    let missing_lines: Vec<_> = h
        .logger
        .messages()
        .into_iter()
        .filter(|m| m.starts_with("Missing config:"))
        .collect();
    assert_eq!(missing_lines.len(), 4);

    let section = h.ctx.plugin_config("notify-firebase").unwrap();
    assert!(section.contains("revisionKey"));
    assert!(section.contains("payload"));
    assert!(section.contains("path"));
    assert!(section.contains("firebaseClient"));

    match err {
        PluginError::Configuration { keys } => {
            assert_eq!(keys, vec!["app".to_string(), "token".to_string()]);
        }
        other => panic!("expected Configuration error, got {other:?}"),
    }
}

#[test]
fn test_defaults_do_not_override_explicit_values() {
    let config = minimal_config().with("path", "some/path");
    let mut h = harness(config, MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();

    let section = h.ctx.plugin_config("notify-firebase").unwrap();
    assert_eq!(
        section.resolve_str("path", &h.ctx).unwrap(),
        Some("some/path".to_string())
    );
    // only the three actually-missing keys were reported
    let missing_lines = h
        .logger
        .messages()
        .into_iter()
        .filter(|m| m.starts_with("Missing config:"))
        .count();
    assert_eq!(missing_lines, 3);
}

#[test]
fn test_missing_required_config_fails_before_any_network() {
    let config = PluginConfig::new().with("app", "some-app");
    let mut h = harness(config, MockFirebase::default());

    let err = h.plugin.configure(&mut h.ctx).unwrap_err();

    match err {
        PluginError::Configuration { keys } => assert_eq!(keys, vec!["token".to_string()]),
        other => panic!("expected Configuration error, got {other:?}"),
    }
    // the client was never constructed, let alone called
    assert!(h.urls.lock().unwrap().is_empty());
    assert!(h.mock.auth_tokens().is_empty());
    assert!(h.mock.writes().is_empty());
}

#[test]
fn test_empty_required_value_is_a_configuration_error() {
    let config = PluginConfig::new()
        .with("app", "some-app")
        .with("token", "");
    let mut h = harness(config, MockFirebase::default());

    let err = h.plugin.configure(&mut h.ctx).unwrap_err();
    assert!(matches!(err, PluginError::Configuration { .. }));
}

#[tokio::test]
async fn test_did_activate_fails_on_auth_error_and_never_writes() {
    let config = minimal_config().with("revisionKey", "123abc");
    let mut h = harness(
        config,
        MockFirebase {
            fail_auth: true,
            ..Default::default()
        },
    );

    h.plugin.configure(&mut h.ctx).unwrap();
    let err = h.plugin.did_activate(&h.ctx).await.unwrap_err();

    assert!(matches!(err, PluginError::Authentication { .. }));
    assert_eq!(h.mock.auth_tokens().len(), 1);
    assert!(h.mock.writes().is_empty());
}

#[tokio::test]
async fn test_did_activate_fails_on_write_error() {
    let config = minimal_config().with("revisionKey", "123abc");
    let mut h = harness(
        config,
        MockFirebase {
            fail_set: true,
            ..Default::default()
        },
    );

    h.plugin.configure(&mut h.ctx).unwrap();
    let err = h.plugin.did_activate(&h.ctx).await.unwrap_err();

    assert!(matches!(err, PluginError::Write { .. }));
    assert_eq!(h.mock.auth_tokens().len(), 1);
    assert_eq!(h.mock.writes().len(), 1);
}

#[tokio::test]
async fn test_did_activate_writes_payload_at_path() {
    let config = minimal_config()
        .with("revisionKey", "123abc")
        .with("path", "some/path")
        .with("payload", json!({ "foo": "bar" }));
    let mut h = harness(config, MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();
    h.plugin.did_activate(&h.ctx).await.unwrap();

    assert_eq!(
        h.mock.auth_tokens(),
        vec!["super-secret-token".to_string()]
    );
    assert_eq!(
        h.mock.writes(),
        vec![("some/path".to_string(), json!({ "foo": "bar" }))]
    );
    assert!(
        h.logger
            .messages()
            .contains(&"notified Firebase of release".to_string())
    );
}

#[tokio::test]
async fn test_default_payload_carries_release_and_timestamp() {
    let config = minimal_config().with("revisionKey", "123abc");
    let mut h = harness(config, MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();
    h.plugin.did_activate(&h.ctx).await.unwrap();

    let writes = h.mock.writes();
    assert_eq!(writes.len(), 1);
    let (path, payload) = &writes[0];
    assert_eq!(path, "release");
    assert_eq!(payload["release"], json!("123abc"));
    assert!(payload["at"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_payload_is_evaluated_at_activation_time() {
    let mut h = harness(minimal_config(), MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();
    // revision only becomes known after configure; the lazily-derived
    // payload must pick it up
    h.ctx.command_options = CommandOptions {
        revision: Some("late-revision".to_string()),
    };
    h.plugin.did_activate(&h.ctx).await.unwrap();

    let writes = h.mock.writes();
    assert_eq!(writes[0].1["release"], json!("late-revision"));
}

#[tokio::test]
async fn test_did_activate_twice_writes_twice() {
    let config = minimal_config().with("revisionKey", "123abc");
    let mut h = harness(config, MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();
    h.plugin.did_activate(&h.ctx).await.unwrap();
    h.plugin.did_activate(&h.ctx).await.unwrap();

    assert_eq!(h.mock.writes().len(), 2);
}

#[tokio::test]
async fn test_client_factory_receives_database_url_for_app() {
    let config = minimal_config().with("revisionKey", "123abc");
    let mut h = harness(config, MockFirebase::default());

    h.plugin.configure(&mut h.ctx).unwrap();
    h.plugin.did_activate(&h.ctx).await.unwrap();

    assert_eq!(
        h.urls.lock().unwrap().clone(),
        vec!["https://some-app.firebaseio.com".to_string()]
    );
}
