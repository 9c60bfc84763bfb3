//! Session-scoped HTTP transport.
//!
//! `SalesforceSession` pairs an instance URL and a session id with a pooled
//! HTTP client. The async bulk API endpoints authenticate with the
//! `X-SFDC-Session` header; the REST endpoints take the same session id as
//! a bearer token.
//!
//! ## Security
//!
//! The session id is redacted in Debug output to prevent accidental
//! exposure in logs.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::DEFAULT_API_VERSION;

/// Content type of async-API XML documents.
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=UTF-8";

/// Content type of CSV batch payloads.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=UTF-8";

/// Session header carrying the credential on async-API requests.
const SESSION_HEADER: &str = "X-SFDC-Session";

/// Longest error-body slice carried into an `Api` error message.
const MAX_ERROR_BODY: usize = 2048;

/// Session handle for the Salesforce async bulk and REST query APIs.
///
/// Holds connection parameters and nothing else; job and batch state lives
/// with the callers in `forcepull-bulk`.
///
/// # Example
///
/// ```rust,ignore
/// use forcepull_client::SalesforceSession;
///
/// let session = SalesforceSession::new(
///     "https://myorg.my.salesforce.com",
///     "session_id_here",
/// )?;
///
/// let status_xml = session
///     .get_text(&session.async_url("job/750xx0000000001/batch/751xx0000000001"))
///     .await?;
/// ```
#[derive(Clone)]
pub struct SalesforceSession {
    http: reqwest::Client,
    config: ClientConfig,
    instance_url: String,
    session_id: String,
    api_version: String,
}

impl std::fmt::Debug for SalesforceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceSession")
            .field("instance_url", &self.instance_url)
            .field("session_id", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl SalesforceSession {
    /// Create a new session with the given instance URL and session id.
    pub fn new(instance_url: impl Into<String>, session_id: impl Into<String>) -> Result<Self> {
        Self::with_config(instance_url, session_id, ClientConfig::default())
    }

    /// Create a new session with custom configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        session_id: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let instance_url = instance_url.into();
        Url::parse(&instance_url)
            .map_err(|e| Error::with_source(ErrorKind::InvalidUrl(instance_url.clone()), e))?;

        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            session_id: session_id.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Set the API version (e.g., "62.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Build the full URL for a path.
    ///
    /// If the path starts with `/`, it's appended to the instance URL.
    /// Otherwise, it's assumed to be a full URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.instance_url, path)
        } else {
            format!("{}/{}", self.instance_url, path)
        }
    }

    /// Build the async bulk API URL for a path.
    ///
    /// Example: `async_url("job")` -> `{instance}/services/async/62.0/job`
    pub fn async_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!(
            "{}/services/async/{}/{}",
            self.instance_url, self.api_version, path
        )
    }

    /// Build the REST API URL for a path.
    ///
    /// Example: `rest_url("query")` -> `{instance}/services/data/v62.0/query`
    pub fn rest_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!(
            "{}/services/data/v{}/{}",
            self.instance_url, self.api_version, path
        )
    }

    // =========================================================================
    // Async bulk API methods (X-SFDC-Session header, XML/CSV bodies)
    // =========================================================================

    /// POST an XML document to an async-API endpoint and return the
    /// response body.
    pub async fn post_xml(&self, url: &str, body: String) -> Result<String> {
        self.post_raw(url, body, XML_CONTENT_TYPE).await
    }

    /// POST a raw body with an explicit content type to an async-API
    /// endpoint and return the response body.
    #[instrument(skip(self, body), fields(url = %url, content_type = %content_type))]
    pub async fn post_raw(&self, url: &str, body: String, content_type: &str) -> Result<String> {
        if self.config.enable_tracing {
            debug!(body_len = body.len(), "Sending async-API POST");
        }

        let response = self
            .http
            .post(url)
            .header(SESSION_HEADER, &self.session_id)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        let response = self.check(response).await?;
        response.text().await.map_err(Into::into)
    }

    /// GET an async-API endpoint and return the response body as text.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .header(SESSION_HEADER, &self.session_id)
            .send()
            .await?;
        let response = self.check(response).await?;
        response.text().await.map_err(Into::into)
    }

    /// GET an async-API endpoint and return the response body fully
    /// buffered. Used for result-set downloads, so the request runs under
    /// `download_timeout` instead of the API timeout.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let response = self
            .http
            .get(url)
            .header(SESSION_HEADER, &self.session_id)
            .timeout(self.config.download_timeout)
            .send()
            .await?;
        let response = self.check(response).await?;

        if self.config.enable_tracing {
            debug!(content_length = response.content_length(), "Buffering result download");
        }
        response.bytes().await.map_err(Into::into)
    }

    // =========================================================================
    // REST API methods (bearer token, JSON bodies)
    // =========================================================================

    /// GET a REST endpoint with JSON response deserialization.
    ///
    /// Accepts an absolute path (resolved against the instance URL, the
    /// shape `nextRecordsUrl` comes back in) or a full URL.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let full_url = self.url(url);
        let response = self
            .http
            .get(&full_url)
            .bearer_auth(&self.session_id)
            .send()
            .await?;
        let response = self.check(response).await?;
        response.json().await.map_err(Into::into)
    }

    /// Map any error status (>= 400) to `ErrorKind::Api` with the response
    /// body attached; pass successful responses through.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            if self.config.enable_tracing {
                debug!(status, "Error response");
            }
            return Err(Error::new(ErrorKind::Api {
                status,
                message: truncate_body(&body),
            }));
        }
        Ok(response)
    }
}

fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent);

    if config.accept_compressed {
        builder = builder.gzip(true).deflate(true);
    } else {
        builder = builder.gzip(false).deflate(false);
    }

    builder
        .build()
        .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
}

/// Cut an error body down to a loggable size at a character boundary.
fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
