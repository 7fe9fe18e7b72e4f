//! Target validation: the only phase allowed to fail a run.

use crate::error::RunError;
use crate::fetch::{PageCache, RenderMode};
use crate::urlnorm;

/// Homepage substrings that identify a hosted-storefront deployment when the
/// catalog feed probe is inconclusive.
const STOREFRONT_MARKERS: &[&str] = &[
    "cdn.shopify.com",
    "myshopify.com",
    "shopify",
    "/products.json",
];

/// Proof that a target URL points at a reachable storefront. Everything
/// downstream takes this instead of a raw URL.
#[derive(Debug, Clone)]
pub struct ValidatedStore {
    base_url: String,
}

impl ValidatedStore {
    /// Canonical origin, no trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validates `raw_url`: canonicalizes it, probes the catalog feed, and
    /// falls back to homepage platform markers.
    ///
    /// # Errors
    ///
    /// [`RunError::InvalidTargetUrl`] for malformed input,
    /// [`RunError::UnreachableTarget`] when neither probe gets a response,
    /// [`RunError::NotAStorefront`] when the site answers but shows no
    /// storefront signature.
    pub async fn check(raw_url: &str, cache: &PageCache) -> Result<Self, RunError> {
        let base_url = urlnorm::normalize_base_url(raw_url)?;

        let probe_url = format!("{base_url}/products.json?limit=1");
        let probe_error = match cache.get_or_fetch(&probe_url, RenderMode::Static).await {
            Ok(body) => {
                if catalog_probe_confirms(&body) {
                    tracing::debug!(base_url, "catalog feed probe confirmed storefront");
                    return Ok(Self { base_url });
                }
                None
            }
            Err(err) => {
                tracing::debug!(base_url, error = %err, "catalog feed probe failed");
                Some(err)
            }
        };

        match cache
            .get_or_fetch(&format!("{base_url}/"), RenderMode::Static)
            .await
        {
            Ok(body) => {
                let lowered = body.to_ascii_lowercase();
                if STOREFRONT_MARKERS.iter().any(|m| lowered.contains(m)) {
                    tracing::debug!(base_url, "homepage markers confirmed storefront");
                    Ok(Self { base_url })
                } else {
                    Err(RunError::NotAStorefront { url: base_url })
                }
            }
            Err(home_err) => {
                // A bot block on the probe with an unreachable homepage still
                // means we could not reach the site as a storefront.
                let source = probe_error.unwrap_or(home_err);
                Err(RunError::UnreachableTarget {
                    url: base_url,
                    source,
                })
            }
        }
    }
}

fn catalog_probe_confirms(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .is_some_and(|v| v.get("products").is_some_and(serde_json::Value::is_array))
}
