//! HTTP client for catalog APIs with rate limiting and error handling
//!
//! Both external systems throttle aggressively, so every request passes
//! through a token-bucket rate limiter before it is sent. Failures are
//! classified by status code so the catalog clients can map them onto the
//! synchronization error taxonomy.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// HTTP client configuration shared by both catalog clients.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "catalog-sync/0.2".to_string(),
            timeout_seconds: 30,
            max_requests_per_second: 4,
            follow_redirects: true,
        }
    }
}

/// Transport- or status-level failure, before taxonomy mapping.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
        retry_after_seconds: Option<u64>,
    },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("invalid response body from {url}: {message}")]
    Decode { url: String, message: String },
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::Status {
                retry_after_seconds, ..
            } => *retry_after_seconds,
            _ => None,
        }
    }
}

/// Rate-limited HTTP client wrapping `reqwest`.
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpClient {
    /// Create a client with the given configuration and default headers
    /// (authentication headers are injected here by the catalog clients).
    pub fn new(config: &HttpClientConfig, mut headers: HeaderMap) -> anyhow::Result<Self> {
        use anyhow::Context;

        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    /// GET returning the raw response, for callers that need headers
    /// (pagination links).
    pub async fn get(&self, url: &str) -> Result<Response, HttpError> {
        self.execute(Method::GET, url, None).await
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let response = self.get(url).await?;
        decode_json(url, response).await
    }

    /// POST a JSON payload and decode the JSON reply.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, HttpError> {
        let response = self.execute(Method::POST, url, Some(body)).await?;
        decode_json(url, response).await
    }

    /// PUT a JSON payload, discarding the reply body.
    pub async fn put_json(&self, url: &str, body: &serde_json::Value) -> Result<(), HttpError> {
        self.execute(Method::PUT, url, Some(body)).await?;
        Ok(())
    }

    /// PATCH a JSON payload, discarding the reply body.
    pub async fn patch_json(&self, url: &str, body: &serde_json::Value) -> Result<(), HttpError> {
        self.execute(Method::PATCH, url, Some(body)).await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, HttpError> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        debug!("📡 {} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|error| HttpError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_seconds = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
                retry_after_seconds,
            });
        }

        Ok(response)
    }
}

async fn decode_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, HttpError> {
    response.json().await.map_err(|error| HttpError::Decode {
        url: url.to_string(),
        message: error.to_string(),
    })
}

fn parse_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Extract the `rel="next"` URL from an RFC-5988 `Link` header, the
/// storefront's pagination mechanism.
pub fn next_page_url(response: &Response) -> Option<String> {
    let header = response
        .headers()
        .get(reqwest::header::LINK)?
        .to_str()
        .ok()?;

    for link in header.split(',') {
        if !link.contains("rel=\"next\"") {
            continue;
        }
        let start = link.find('<')?;
        let end = link.find('>')?;
        if start < end {
            return Some(link[start + 1..end].to_string());
        }
    }
    None
}
