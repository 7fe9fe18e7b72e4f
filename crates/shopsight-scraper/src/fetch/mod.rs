//! The page-fetch capability: trait seam, error taxonomy, and the bundled
//! plain-HTTP implementation.
//!
//! Script-executing (headless) rendering stays behind the same trait; the
//! bundled [`HttpFetcher`] serves `Rendered` requests with a static GET and
//! logs the downgrade at `debug`.

mod cache;

pub use cache::PageCache;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// How a page should be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Plain HTTP GET of the document as served.
    Static,
    /// Content after script execution (headless browser). External engines
    /// implement this; the bundled fetcher degrades it to a static GET.
    Rendered,
}

/// Errors at the fetcher seam.
///
/// `Clone` so a failed fetch can be cached for the run and replayed to every
/// extractor that asks for the same URL.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("blocked by bot protection at {url}")]
    Blocked { url: String },

    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },
}

impl FetchError {
    /// Transient failures are worth one more attempt; 404 and bot blocks are
    /// not.
    #[must_use]
    pub(crate) fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. } | FetchError::Network { .. }
        )
    }
}

/// The consumed page-fetch capability: fetch one URL in a rendering mode,
/// returning the body or a typed failure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, mode: RenderMode) -> Result<String, FetchError>;
}

/// Plain-HTTP [`PageFetcher`] backed by `reqwest`.
///
/// Carries a browser-like `User-Agent`, a per-request timeout, and a bounded
/// retry with jittered backoff on transient transport errors. Responses that
/// look like a bot-protection interstitial map to [`FetchError::Blocked`].
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpFetcher {
    /// Creates a fetcher with the given timeout, `User-Agent`, and retry
    /// policy. `max_retries` is the number of additional attempts after the
    /// first failure; `0` disables retries.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_owned(),
            });
        }
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(FetchError::Blocked {
                url: url.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Network {
                url: url.to_owned(),
                reason: format!("unexpected HTTP status {}", status.as_u16()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        if looks_like_bot_challenge(&body) {
            return Err(FetchError::Blocked {
                url: url.to_owned(),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, mode: RenderMode) -> Result<String, FetchError> {
        if mode == RenderMode::Rendered {
            tracing::debug!(url, "rendered fetch requested; serving static GET");
        }

        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    if !err.is_transient() || attempt >= self.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let computed = self
                        .backoff_base_ms
                        .saturating_mul(1u64 << (attempt - 1).min(10));
                    #[allow(
                        clippy::cast_possible_truncation,
                        clippy::cast_sign_loss,
                        clippy::cast_precision_loss
                    )]
                    let delay_ms = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                    tracing::debug!(
                        url,
                        attempt,
                        delay_ms,
                        error = %err,
                        "transient fetch error; retrying after backoff"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

fn classify_transport_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_owned(),
        }
    } else {
        FetchError::Network {
            url: url.to_owned(),
            reason: err.to_string(),
        }
    }
}

fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    let has_cloudflare_banner = lowered.contains("attention required! | cloudflare");
    let has_challenge_platform = lowered.contains("/cdn-cgi/challenge-platform/");
    let has_just_a_moment = lowered.contains("just a moment...");
    let has_cookie_gate = lowered.contains("please enable cookies");
    let has_cf_chl = lowered.contains("cf-chl-");

    has_cloudflare_banner
        || has_challenge_platform
        || (has_just_a_moment && has_cookie_gate)
        || (has_just_a_moment && has_cf_chl)
}
