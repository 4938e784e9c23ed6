//! Resolving fetch descriptors to data.
//!
//! [`FetchExecutor`] turns a [`FetchDescriptor`] into a [`FetchResult`]:
//!
//! - **Local sources** (`path`) are read from disk. A leading `/` means "under
//!   the public directory" (falling back to the site root); anything else is
//!   relative to the site root. JSON and YAML are detected by extension.
//! - **Remote sources** (`url`) are fetched with an HTTP `GET` expecting JSON.
//!   Connection failures, timeouts and 5xx responses are retried with
//!   exponential backoff.
//!
//! Either way the payload then runs through the query pipeline
//! ([`apply_post_processing`]) before it is returned.
//!
//! # Failure model
//!
//! The executor never fails. A source that cannot be read produces
//! `FetchResult { data: Some([]), error: Some(..) }`, so callers can treat
//! "missing" as "empty collection" and keep building.

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use super::FetchDescriptor;
use super::query::apply_post_processing;
use crate::config::BuildConfig;
use crate::constants::{
    DEFAULT_FETCH_RETRIES, DEFAULT_FETCH_TIMEOUT, DEFAULT_PUBLIC_DIR, DEFAULT_USER_AGENT, MAX_BACKOFF_DELAY_MS,
    STARTING_BACKOFF_DELAY_MS,
};
use crate::utils::fs::read_structured_file_async;

/// Outcome of one fetch.
///
/// `data` is `None` only when there was no descriptor to execute. When the
/// source was unavailable `data` is an empty array and `error` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Fetched (and post-processed) data
    pub data: Option<Value>,
    /// Human-readable cause when the source could not be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResult {
    /// Result for an absent descriptor.
    pub const fn empty() -> Self {
        Self {
            data: None,
            error: None,
        }
    }

    /// Successful result.
    pub const fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Result for a source that could not be read.
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            data: Some(Value::Array(Vec::new())),
            error: Some(error.into()),
        }
    }

    /// Whether the fetch succeeded.
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Where local sources live and how remote sources are requested.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Root for relative paths
    pub site_root: PathBuf,
    /// Root for `/`-prefixed paths
    pub public_dir: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries for transient remote failures
    pub retries: usize,
    /// `User-Agent` header
    pub user_agent: String,
}

impl ExecutorOptions {
    /// Defaults for a site root: `public/` under it, default timeout and retries.
    pub fn new(site_root: impl Into<PathBuf>) -> Self {
        let site_root = site_root.into();
        Self {
            public_dir: site_root.join(DEFAULT_PUBLIC_DIR),
            site_root,
            timeout: DEFAULT_FETCH_TIMEOUT,
            retries: DEFAULT_FETCH_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Options matching a resolved [`BuildConfig`].
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            site_root: config.site_root.clone(),
            public_dir: config.public_dir.clone(),
            timeout: config.fetch.timeout(),
            retries: config.fetch.retries,
            user_agent: config.fetch.user_agent.clone(),
        }
    }
}

#[derive(Debug)]
enum RemoteError {
    /// Worth retrying: connect failure, timeout, 5xx
    Transient(String),
    Fatal(String),
}

impl RemoteError {
    const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    fn into_message(self) -> String {
        match self {
            Self::Transient(msg) | Self::Fatal(msg) => msg,
        }
    }
}

/// Executes fetch descriptors against the local site and remote endpoints.
#[derive(Debug, Clone)]
pub struct FetchExecutor {
    options: ExecutorOptions,
    client: reqwest::Client,
}

impl FetchExecutor {
    /// Create an executor with one shared HTTP client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed (TLS backend failure).
    pub fn new(options: ExecutorOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            options,
            client,
        })
    }

    /// Options this executor was created with.
    pub const fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Resolve one descriptor.
    ///
    /// `None` yields [`FetchResult::empty`]. The descriptor's `prerender` flag
    /// is not consulted here; callers decide what runs at build time.
    pub async fn execute(&self, descriptor: Option<&FetchDescriptor>) -> FetchResult {
        let Some(descriptor) = descriptor else {
            return FetchResult::empty();
        };

        let raw = match (&descriptor.path, &descriptor.url) {
            (Some(path), _) => self.load_local(path).await,
            (None, Some(url)) => self.load_remote(url).await,
            (None, None) => Err(format!("fetch for schema '{}' has no path or url", descriptor.schema)),
        };

        match raw {
            Ok(payload) => {
                let data = apply_post_processing(payload, descriptor);
                debug!(
                    "Fetched {} for schema '{}' ({} items)",
                    descriptor.source(),
                    descriptor.schema,
                    data.as_array().map_or(1, Vec::len)
                );
                FetchResult::ok(data)
            }
            Err(error) => {
                warn!("Data fetch failed for schema '{}': {}", descriptor.schema, error);
                FetchResult::unavailable(error)
            }
        }
    }

    /// Resolve several independent descriptors concurrently.
    ///
    /// Results are keyed by schema; when two descriptors share a schema the
    /// later one in `descriptors` wins. An empty slice yields an empty map.
    pub async fn execute_multiple(&self, descriptors: &[FetchDescriptor]) -> HashMap<String, FetchResult> {
        if descriptors.is_empty() {
            return HashMap::new();
        }

        let futures = descriptors.iter().map(|descriptor| async move {
            (descriptor.schema.clone(), self.execute(Some(descriptor)).await)
        });

        join_all(futures).await.into_iter().collect()
    }

    /// Candidate files for a local path, in lookup order.
    pub fn resolve_path(&self, path: &str) -> Vec<PathBuf> {
        match path.strip_prefix('/') {
            Some(rooted) => {
                vec![self.options.public_dir.join(rooted), self.options.site_root.join(rooted)]
            }
            None => vec![self.options.site_root.join(path)],
        }
    }

    async fn load_local(&self, path: &str) -> std::result::Result<Value, String> {
        for candidate in self.resolve_path(path) {
            match read_structured_file_async(&candidate).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(parse_error)) => return Err(format!("{path}: {parse_error:#}")),
                Err(io_error) if io_error.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Data file not at {}", candidate.display());
                }
                Err(io_error) => return Err(format!("{}: {io_error}", display_path(&candidate))),
            }
        }
        Err(format!("{path} not found"))
    }

    async fn load_remote(&self, url: &str) -> std::result::Result<Value, String> {
        let strategy = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
            .map(jitter)
            .take(self.options.retries);

        RetryIf::start(strategy, || self.request_json(url), RemoteError::is_transient)
            .await
            .map_err(RemoteError::into_message)
    }

    async fn request_json(&self, url: &str) -> std::result::Result<Value, RemoteError> {
        debug!("GET {}", url);
        let response = self.client.get(url).header(ACCEPT, "application/json").send().await.map_err(|e| {
            let msg = format!("request to {url} failed: {e}");
            if e.is_connect() || e.is_timeout() {
                RemoteError::Transient(msg)
            } else {
                RemoteError::Fatal(msg)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let msg = format!("HTTP {status} for {url}");
            return Err(if status.is_server_error() {
                RemoteError::Transient(msg)
            } else {
                RemoteError::Fatal(msg)
            });
        }

        response.json::<Value>().await.map_err(|e| RemoteError::Fatal(format!("invalid JSON from {url}: {e}")))
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote_executor(retries: usize, timeout: Duration) -> (TempDir, FetchExecutor) {
        let temp = TempDir::new().unwrap();
        let mut options = ExecutorOptions::new(temp.path());
        options.retries = retries;
        options.timeout = timeout;
        let executor = FetchExecutor::new(options).unwrap();
        (temp, executor)
    }

    fn site() -> (TempDir, FetchExecutor) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public/data")).unwrap();
        fs::create_dir_all(temp.path().join("content")).unwrap();
        let mut options = ExecutorOptions::new(temp.path());
        options.retries = 0;
        options.timeout = Duration::from_secs(2);
        let executor = FetchExecutor::new(options).unwrap();
        (temp, executor)
    }

    #[tokio::test]
    async fn test_execute_none_is_empty() {
        let (_temp, executor) = site();
        let result = executor.execute(None).await;
        assert_eq!(result, FetchResult::empty());
        assert!(result.data.is_none());
    }

    #[tokio::test]
    async fn test_local_json_from_public_dir() {
        let (temp, executor) = site();
        fs::write(temp.path().join("public/data/team.json"), r#"[{"name": "Ada"}, {"name": "Linus"}]"#).unwrap();

        let desc = FetchDescriptor::parse(&json!("/data/team.json")).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert!(result.is_ok());
        assert_eq!(result.data, Some(json!([{"name": "Ada"}, {"name": "Linus"}])));
    }

    #[tokio::test]
    async fn test_local_yaml_relative_to_site_root() {
        let (temp, executor) = site();
        fs::write(temp.path().join("content/events.yml"), "- title: Launch\n  day: 2\n- title: Kickoff\n  day: 1\n")
            .unwrap();

        let desc = FetchDescriptor::parse(&json!({"path": "content/events.yml", "sort": "day"})).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([{"title": "Kickoff", "day": 1}, {"title": "Launch", "day": 2}])));
    }

    #[tokio::test]
    async fn test_rooted_path_falls_back_to_site_root() {
        let (temp, executor) = site();
        fs::create_dir_all(temp.path().join("data")).unwrap();
        fs::write(temp.path().join("data/faq.json"), r#"{"items": [1, 2]}"#).unwrap();

        let desc = FetchDescriptor::parse(&json!({"path": "/data/faq.json", "transform": "items"})).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_with_error() {
        let (_temp, executor) = site();
        let desc = FetchDescriptor::parse(&json!("/data/missing.json")).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([])));
        assert_eq!(result.error.as_deref(), Some("/data/missing.json not found"));
    }

    #[tokio::test]
    async fn test_malformed_file_is_empty_with_error() {
        let (temp, executor) = site();
        fs::write(temp.path().join("public/data/bad.json"), "{oops").unwrap();

        let desc = FetchDescriptor::parse(&json!("/data/bad.json")).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([])));
        assert!(result.error.unwrap().starts_with("/data/bad.json:"));
    }

    #[tokio::test]
    async fn test_unreachable_url_degrades() {
        let (_temp, executor) = site();
        let desc = FetchDescriptor::parse(&json!({"url": "http://127.0.0.1:1/posts.json"})).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([])));
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_remote_json_is_post_processed() {
        let (_temp, executor) = site();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/items"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"items": [{"n": 2}, {"n": 1}, {"n": 3}]}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let desc = FetchDescriptor::parse(&json!({
            "url": format!("{}/v1/items", server.uri()),
            "transform": "data.items",
            "sort": "n desc",
            "limit": 2
        }))
        .unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.data, Some(json!([{"n": 3}, {"n": 2}])));
    }

    #[tokio::test]
    async fn test_remote_client_error_is_not_retried() {
        let (_temp, executor) = remote_executor(3, Duration::from_secs(2));
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "gone"})))
            .expect(1)
            .mount(&server)
            .await;

        let desc = FetchDescriptor::parse(&json!({"url": format!("{}/posts", server.uri())})).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([])));
        assert!(result.error.unwrap().starts_with("HTTP 404"));
    }

    #[tokio::test]
    async fn test_remote_server_error_is_retried() {
        let (_temp, executor) = remote_executor(2, Duration::from_secs(2));
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let desc = FetchDescriptor::parse(&json!({"url": format!("{}/posts", server.uri())})).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([])));
        assert!(result.error.unwrap().starts_with("HTTP 503"));
    }

    #[tokio::test]
    async fn test_remote_timeout_degrades_to_empty() {
        let (_temp, executor) = remote_executor(1, Duration::from_millis(200));
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let url = format!("{}/slow.json", server.uri());
        let desc = FetchDescriptor::parse(&json!({"url": url})).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([])));
        let error = result.error.unwrap();
        assert!(error.starts_with(&format!("request to {url} failed")), "{error}");
    }

    #[tokio::test]
    async fn test_remote_invalid_json_is_not_retried() {
        let (_temp, executor) = remote_executor(2, Duration::from_secs(2));
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .expect(1)
            .mount(&server)
            .await;

        let desc = FetchDescriptor::parse(&json!({"url": format!("{}/feed", server.uri())})).unwrap();
        let result = executor.execute(Some(&desc)).await;

        assert_eq!(result.data, Some(json!([])));
        assert!(result.error.unwrap().starts_with("invalid JSON from"));
    }

    #[tokio::test]
    async fn test_execute_multiple_keys_by_schema() {
        let (temp, executor) = site();
        fs::write(temp.path().join("public/data/a.json"), "[1]").unwrap();
        fs::write(temp.path().join("public/data/b.json"), "[2]").unwrap();

        let descriptors = vec![
            FetchDescriptor::parse(&json!("/data/a.json")).unwrap(),
            FetchDescriptor::parse(&json!("/data/b.json")).unwrap(),
            FetchDescriptor::parse(&json!("/data/c.json")).unwrap(),
        ];
        let results = executor.execute_multiple(&descriptors).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results["a"].data, Some(json!([1])));
        assert_eq!(results["b"].data, Some(json!([2])));
        assert!(!results["c"].is_ok());
    }

    #[tokio::test]
    async fn test_execute_multiple_empty() {
        let (_temp, executor) = site();
        assert!(executor.execute_multiple(&[]).await.is_empty());
    }
}
