//! Shared HTTP client for host API lookups and webhook delivery
//!
//! One `reqwest::Client` per process. No retries and no rate limiting: each
//! widget action issues a handful of sequential requests and the first failure
//! ends the action.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::domain::errors::RemoteLookupError;

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
    /// Honour HTTP(S)_PROXY style environment variables
    pub use_system_proxy: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("page-validation-widget/{}", env!("CARGO_PKG_VERSION")),
            follow_redirects: true,
            use_system_proxy: true,
        }
    }
}

/// Response of a request whose body is only informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    /// Optional context label for provenance in logs (e.g., "ContentApi", "Webhook")
    context_label: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = ClientBuilder::new();
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;

        Ok(Self {
            client,
            config,
            context_label: None,
        })
    }

    /// Set a human-readable context label for logging provenance (returns self for chaining)
    pub fn with_context_label(mut self, label: &str) -> Self {
        self.context_label = Some(label.to_string());
        self
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn label(&self) -> &str {
        self.context_label.as_deref().unwrap_or("http")
    }

    /// GET expecting a JSON answer
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).header(ACCEPT, "application/json")
    }

    /// Sends `request` and decodes a JSON body.
    ///
    /// Non-2xx answers become `RemoteLookupError::Status`, requests that never
    /// complete become `RemoteLookupError::Transport`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
        url: &str,
    ) -> Result<T, RemoteLookupError> {
        info!("🌐 HTTP GET [{}] {}: {}", self.label(), resource, url);

        let response = request.send().await.map_err(|e| {
            error!("❌ Transport error [{}] {}: {}", self.label(), url, e);
            RemoteLookupError::transport(resource, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {} [{}]: {}", status, self.label(), url);
            return Err(RemoteLookupError::status(
                resource,
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status"),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            error!("❌ Failed to decode {} response from {}: {}", resource, url, e);
            RemoteLookupError::decode(resource, e.to_string())
        })
    }

    /// POST a JSON body and return whatever text comes back.
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<TextResponse, reqwest::Error> {
        info!("📮 HTTP POST [{}]", self.label());
        debug!("POST target: {}", url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠️ POST [{}] answered {} but the body could not be read: {}", self.label(), status, e);
                String::new()
            }
        };
        Ok(TextResponse { status, body })
    }
}
