use std::sync::LazyLock;
use std::time::Duration;

/// Shared HTTP client for all REST database calls.
///
/// Initialized lazily on first access and reused across deploy runs within
/// the same process. Connection pooling matters little for a plugin that
/// performs two requests per run, but the client carries the timeout and
/// TLS configuration in one place.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .https_only(true)
        .use_rustls_tls()
        .build()
        .expect("Failed to build HTTP client")
});
