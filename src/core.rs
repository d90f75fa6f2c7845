use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Response, StatusCode};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::{EdgarConfig, EdgarUrls};
use super::error::{EdgarError, Result};

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 1000;
const PREVIEW_CHARS: usize = 200;

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Rate-limited HTTP client for the EDGAR archives.
///
/// Every request first waits on a token bucket sized to the configured rate limit, so callers
/// never need their own throttling. HTTP 429 responses and transport failures are retried up to
/// five times, honoring `Retry-After` when the server sends one and otherwise backing off
/// exponentially with jitter (1s, 2s, 4s, ...).
///
/// ```rust
/// # use edgar13f::Edgar;
/// let edgar = Edgar::new("my_app/1.0 (my@email.com)")?;
/// assert_eq!(edgar.archives_url(), "https://www.sec.gov/Archives/edgar");
/// # Ok::<(), edgar13f::EdgarError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Edgar {
    pub(crate) client: reqwest::Client,
    pub(crate) rate_limiter: Arc<Governor>,
    pub(crate) edgar_archives_url: String,
}

/// What to do with a response once its status is known.
enum Outcome {
    Body(Response),
    Retry(Duration),
}

impl Edgar {
    /// Creates a client with the default rate limit, a 30 second timeout and the public
    /// SEC.gov archive.
    ///
    /// # Errors
    ///
    /// `EdgarError::ConfigError` if `user_agent` is not a valid header value.
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_config(EdgarConfig {
            user_agent: user_agent.to_string(),
            base_urls: EdgarUrls::default(),
            ..EdgarConfig::default()
        })
    }

    /// Creates a client from explicit settings.
    ///
    /// # Errors
    ///
    /// `EdgarError::ConfigError` for a malformed user agent, a zero rate limit, or an HTTP
    /// client that cannot be built.
    pub fn with_config(config: EdgarConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| EdgarError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| EdgarError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let quota = NonZeroU32::new(config.rate_limit).ok_or_else(|| {
            EdgarError::ConfigError("Rate limit must be greater than zero".to_string())
        })?;

        Ok(Edgar {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(quota))),
            edgar_archives_url: config.base_urls.archives,
        })
    }

    /// `2^retry` seconds, give or take 20%.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(retry);
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Sends a rate-limited GET, retrying throttled and failed requests.
    async fn send(&self, url: &str) -> Result<Response> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            let outcome = match self.client.get(url).send().await {
                Ok(response) => Self::classify(url, response, retries).await?,
                Err(e) if retries >= MAX_RETRIES => return Err(EdgarError::RequestError(e)),
                Err(e) => {
                    tracing::warn!("Request failed for {}: {:?}", url, e);
                    Outcome::Retry(Self::calculate_backoff(retries))
                }
            };

            match outcome {
                Outcome::Body(response) => return Ok(response),
                Outcome::Retry(delay) => {
                    tracing::warn!(
                        "Retrying {} (attempt {}/{}) in {:?}",
                        url,
                        retries + 1,
                        MAX_RETRIES + 1,
                        delay
                    );
                    sleep(delay).await;
                    retries += 1;
                }
            }
        }
    }

    async fn classify(url: &str, response: Response, retries: u32) -> Result<Outcome> {
        match response.status() {
            StatusCode::OK => Ok(Outcome::Body(response)),
            StatusCode::NOT_FOUND => Err(EdgarError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => {
                if retries >= MAX_RETRIES {
                    return Err(EdgarError::RateLimitExceeded);
                }
                let delay = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| Self::calculate_backoff(retries));
                Ok(Outcome::Retry(delay))
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".to_string());
                Err(EdgarError::InvalidResponse(format!(
                    "Unexpected status code: {} for URL: {}. Response preview: {}",
                    status,
                    url,
                    preview(&body)
                )))
            }
        }
    }

    /// Fetches raw bytes, used for gzipped index files.
    ///
    /// # Errors
    ///
    /// * `EdgarError::NotFound` on HTTP 404.
    /// * `EdgarError::RateLimitExceeded` when throttling persists past the retry budget.
    /// * `EdgarError::RequestError` on transport failure.
    /// * `EdgarError::InvalidResponse` for any other status.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetches a text resource.
    ///
    /// For `.json` URLs an HTML body (the SEC's error page) is rejected with
    /// `EdgarError::UnexpectedContentType`. A JSON body mislabelled `text/html` is accepted.
    ///
    /// # Errors
    ///
    /// As [`Edgar::get_bytes`], plus `UnexpectedContentType` as above.
    pub async fn get(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if url.ends_with(".json") {
            if let Some(ct) = content_type.filter(|ct| ct.to_lowercase().contains("text/html")) {
                if !looks_like_json(&body) {
                    return Err(EdgarError::UnexpectedContentType {
                        url: url.to_string(),
                        expected_pattern: "application/json".to_string(),
                        got_content_type: ct,
                        content_preview: preview(&body),
                    });
                }
                tracing::warn!("Received text/html for JSON resource {}", url);
            }
        }

        Ok(body)
    }

    pub fn archives_url(&self) -> &str {
        &self.edgar_archives_url
    }
}

fn looks_like_json(body: &str) -> bool {
    let body = body.trim_start();
    body.starts_with('{') || body.starts_with('[')
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}
