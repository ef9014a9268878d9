//! REST implementation of the database client.
//!
//! Speaks the Firebase Realtime Database REST API using the shared
//! `HTTP_CLIENT`. The legacy SDK's `authWithCustomToken` RPC has no REST
//! equivalent, so authentication is a shallow authenticated read of the
//! database root; on success the token is retained and appended to the
//! subsequent write.

use reqwest::Url;
use tokio::sync::RwLock;

use super::client::{ClientError, FirebaseClient};
use super::http::HTTP_CLIENT;
use async_trait::async_trait;

/// Production Firebase Realtime Database client.
///
/// One instance per deploy run; `auth_with_custom_token` must succeed before
/// `set` is called (the plugin guarantees that ordering).
pub struct RestFirebaseClient {
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl RestFirebaseClient {
    /// Creates a client for a database base URL such as
    /// `https://my-app.firebaseio.com`
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let url = Url::parse(base_url).map_err(|e| {
            ClientError::Other(anyhow::anyhow!("Invalid database URL {base_url}: {e}"))
        })?;

        Ok(Self {
            base_url: url,
            token: RwLock::new(None),
        })
    }

    /// Creates a client for an application identifier, using the standard
    /// `https://<app>.firebaseio.com` database URL
    pub fn for_app(app: &str) -> Result<Self, ClientError> {
        Self::new(&format!("https://{app}.firebaseio.com"))
    }

    /// Builds the REST endpoint for a database path: `<base>/<path>.json`
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let trimmed = path.trim_matches('/');
        let full = format!("{}/{}.json", self.base_url.as_str().trim_end_matches('/'), trimmed);
        Url::parse(&full)
            .map_err(|e| ClientError::Other(anyhow::anyhow!("Invalid database path {path}: {e}")))
    }

    async fn reject_on_error(response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl FirebaseClient for RestFirebaseClient {
    /// Probes the database root with a shallow authenticated read and
    /// retains the token for later writes
    async fn auth_with_custom_token(&self, token: &str) -> Result<(), ClientError> {
        let url = self.endpoint("")?;

        let response = HTTP_CLIENT
            .get(url)
            .query(&[("shallow", "true"), ("auth", token)])
            .send()
            .await?;

        Self::reject_on_error(response).await?;

        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    /// Writes `value` at `path` with the retained auth token
    async fn set(&self, path: &str, value: &serde_json::Value) -> Result<(), ClientError> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(ClientError::Unauthenticated)?;

        let url = self.endpoint(path)?;

        let response = HTTP_CLIENT
            .put(url)
            .query(&[("auth", token.as_str())])
            .json(value)
            .send()
            .await?;

        Self::reject_on_error(response).await
    }
}
