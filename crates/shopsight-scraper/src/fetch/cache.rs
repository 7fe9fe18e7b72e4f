//! Per-run memoization of page fetches.
//!
//! Several extractors want the same pages (homepage, about, contact). The
//! cache coalesces concurrent requests for one URL into a single fetch and
//! replays the memoized outcome, success or failure, to every caller for the
//! rest of the run.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use super::{FetchError, PageFetcher, RenderMode};

type CacheEntry = Arc<OnceCell<Result<Arc<str>, FetchError>>>;

/// Run-scoped page cache wrapping a [`PageFetcher`].
pub struct PageCache {
    fetcher: Arc<dyn PageFetcher>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl PageCache {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached body for `url`, fetching it once if absent.
    ///
    /// Concurrent callers for the same URL block on a shared `OnceCell`, so
    /// at most one request per URL hits the network per run. Failures are
    /// memoized too.
    ///
    /// # Errors
    ///
    /// Replays the memoized [`FetchError`] when the single fetch failed.
    pub async fn get_or_fetch(
        &self,
        url: &str,
        mode: RenderMode,
    ) -> Result<Arc<str>, FetchError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(url.to_owned()).or_default())
        };

        let outcome = cell
            .get_or_init(|| async {
                self.fetcher
                    .fetch(url, mode)
                    .await
                    .map(|body| Arc::from(body.as_str()))
            })
            .await;

        outcome.clone()
    }

    /// All successfully fetched pages, sorted by URL.
    ///
    /// The sorted order makes the page-scanning extractors deterministic
    /// regardless of fetch completion order.
    pub async fn snapshot(&self) -> Vec<(String, Arc<str>)> {
        let entries = self.entries.lock().await;
        let mut pages: Vec<(String, Arc<str>)> = entries
            .iter()
            .filter_map(|(url, cell)| match cell.get() {
                Some(Ok(body)) => Some((url.clone(), Arc::clone(body))),
                _ => None,
            })
            .collect();
        pages.sort_by(|a, b| a.0.cmp(&b.0));
        pages
    }
}
