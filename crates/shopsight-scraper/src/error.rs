use thiserror::Error;

use crate::fetch::FetchError;

/// Run-fatal errors, raised only during validation. Everything downstream of
/// a successful validation is best-effort and never surfaces an error to the
/// caller.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid target URL \"{url}\": {reason}")]
    InvalidTargetUrl { url: String, reason: String },

    #[error("target unreachable: {url}: {source}")]
    UnreachableTarget {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("no storefront signature found at {url}")]
    NotAStorefront { url: String },
}

/// Per-extractor failures. Absorbed by the orchestrator: the affected
/// category is simply absent or empty in the aggregate.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("catalog feed unavailable at {url}: {reason}")]
    CatalogUnavailable { url: String, reason: String },

    #[error("page fetch failed for {url}: {source}")]
    PageFetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("no {category} found")]
    NoMatchFound { category: &'static str },

    #[error("competitor lookup failed for {domain}: {reason}")]
    CompetitorLookupFailed { domain: String, reason: String },
}
