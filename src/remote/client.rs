//! HTTP transport for page fetches
//!
//! Wraps reqwest with:
//! - per-request timeout
//! - token bucket rate limiting
//! - optional transport-level retries with backoff (off by default)
//!
//! Every failure is classified into a [`FetchError`].

use super::rate_limit::RateLimiter;
use crate::config::HttpConfig;
use crate::error::{Error, FetchError, Result};
use crate::types::{BackoffType, JsonValue};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries (0 = single attempt)
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Requests per second (0 = unlimited)
    pub requests_per_second: u32,
    /// Burst size for the rate limiter
    pub burst_size: u32,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for HttpClientConfig {
    fn from(http: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(http.timeout_secs),
            max_retries: http.max_retries,
            initial_backoff: Duration::from_millis(http.initial_backoff_ms),
            max_backoff: Duration::from_millis(http.max_backoff_ms),
            backoff_type: http.backoff,
            requests_per_second: http.requests_per_second,
            burst_size: http.burst_size,
            user_agent: http
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("page-mediator/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// HTTP client with rate limiting and optional retry
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client from configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let rate_limiter = RateLimiter::new(config.requests_per_second, config.burst_size);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// GET `url` with `query` and parse the body as JSON
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> std::result::Result<JsonValue, FetchError> {
        let response = self.get(url, query).await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| FetchError::invalid_response(format!("Body is not valid JSON: {e}")))
    }

    /// GET with retry; returns the first successful response
    pub async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> std::result::Result<Response, FetchError> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let err = match self.client.get(url).query(query).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!("GET {} succeeded ({})", url, status.as_u16());
                        return Ok(response);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        FetchError::RateLimited {
                            retry_after_seconds: extract_retry_after(&response),
                        }
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        FetchError::remote(status.as_u16(), body)
                    }
                }
                Err(e) if e.is_timeout() => FetchError::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                },
                Err(e) => FetchError::from(e),
            };

            if attempt >= max_retries || !err.is_retryable() {
                return Err(err);
            }

            let delay = match &err {
                FetchError::RateLimited {
                    retry_after_seconds,
                } => Duration::from_secs(*retry_after_seconds).min(self.config.max_backoff),
                _ => self.calculate_backoff(attempt),
            };
            warn!(
                "GET {} failed ({}), attempt {}/{}, retrying in {:?}",
                url,
                err,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
