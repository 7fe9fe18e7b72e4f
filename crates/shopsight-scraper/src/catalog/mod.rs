//! Paginated pull of the storefront's public JSON catalog feed.

mod normalize;
mod types;

pub use normalize::normalize_product;
pub use types::{CatalogPage, FeedProduct};

use std::collections::HashSet;
use std::time::Duration;

use shopsight_core::Product;

use crate::error::ExtractError;
use crate::fetch::{PageCache, RenderMode};

/// Pagination knobs, derived from run options.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub max_pages: usize,
    pub page_size: u32,
    pub inter_page_delay_ms: u64,
}

/// Everything one paginated pull produced.
#[derive(Debug, Default)]
pub struct CatalogPull {
    pub products: Vec<Product>,
    pub skipped_untitled: usize,
    pub pages_fetched: usize,
}

/// Walks `{base}/products.json?page=N&limit=K` until the feed signals
/// end-of-data or a stop guard trips.
///
/// Stop conditions: a page shorter than the page size, the configured page
/// cap, or two consecutive pages contributing zero new identifiers (loop
/// guard against feeds that echo the same page forever). Products are
/// deduplicated by identifier in first-seen order; untitled items are counted
/// and dropped.
///
/// # Errors
///
/// [`ExtractError::CatalogUnavailable`] when the first page cannot be fetched
/// or is not a catalog payload. Later-page failures end the walk with what was
/// already collected.
pub async fn pull_catalog(
    base_url: &str,
    cache: &PageCache,
    opts: &CatalogOptions,
) -> Result<CatalogPull, ExtractError> {
    let mut pull = CatalogPull::default();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut stale_pages = 0usize;

    for page in 1..=opts.max_pages {
        let url = format!(
            "{base_url}/products.json?page={page}&limit={}",
            opts.page_size
        );
        let body = match cache.get_or_fetch(&url, RenderMode::Static).await {
            Ok(body) => body,
            Err(err) if page == 1 => {
                return Err(ExtractError::CatalogUnavailable {
                    url,
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "catalog page fetch failed; stopping walk");
                break;
            }
        };

        let parsed: CatalogPage = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(err) if page == 1 => {
                return Err(ExtractError::CatalogUnavailable {
                    url,
                    reason: format!("non-catalog payload: {err}"),
                });
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "catalog page unparseable; stopping walk");
                break;
            }
        };

        pull.pages_fetched += 1;
        let item_count = parsed.products.len();
        let mut new_this_page = 0usize;

        for item in &parsed.products {
            if let Some(id) = &item.id {
                if !seen_ids.insert(id.clone()) {
                    continue;
                }
            }
            match normalize_product(base_url, item) {
                Some(product) => {
                    new_this_page += 1;
                    pull.products.push(product);
                }
                None => pull.skipped_untitled += 1,
            }
        }

        tracing::debug!(
            page,
            item_count,
            new_this_page,
            total = pull.products.len(),
            "catalog page processed"
        );

        if item_count < opts.page_size as usize {
            break;
        }
        if new_this_page == 0 {
            stale_pages += 1;
            if stale_pages >= 2 {
                tracing::debug!(page, "two consecutive pages without new products; stopping");
                break;
            }
        } else {
            stale_pages = 0;
        }

        if page < opts.max_pages && opts.inter_page_delay_ms > 0 {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let delay_ms = (opts.inter_page_delay_ms as f64
                * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    Ok(pull)
}
