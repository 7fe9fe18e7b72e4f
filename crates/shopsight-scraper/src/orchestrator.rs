//! Run orchestration: validate, fan out the extractors, absorb failures,
//! assemble the immutable aggregate.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shopsight_core::{AppConfig, Competitor, ContactInfo, Policies, StoreInsights};
use tokio::time::Instant;
use uuid::Uuid;

use crate::catalog::{self, CatalogOptions, CatalogPull};
use crate::competitor::{self, CompetitorCandidate, CompetitorSource};
use crate::error::{ExtractError, RunError};
use crate::extract;
use crate::fetch::{PageCache, PageFetcher, RenderMode};
use crate::urlnorm;
use crate::validate::ValidatedStore;

/// Lifecycle of one run. `Failed` is reachable only from `Validating`;
/// everything after validation is best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Pending,
    Validating,
    Extracting,
    DiscoveringCompetitors,
    Aggregated,
    Done,
    Failed,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Pending => "pending",
            RunPhase::Validating => "validating",
            RunPhase::Extracting => "extracting",
            RunPhase::DiscoveringCompetitors => "discovering-competitors",
            RunPhase::Aggregated => "aggregated",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Per-run settings, passed explicitly so one process can run concurrent
/// extractions with different knobs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_catalog_pages: usize,
    pub catalog_page_size: u32,
    pub inter_page_delay_ms: u64,
    pub max_competitors: usize,
    pub competitor_discovery: bool,
    pub run_deadline_secs: u64,
    pub brand_context_min_chars: usize,
    pub brand_context_max_chars: usize,
    pub fanout_width: usize,
    /// Homepage render mode; subsidiary pages are always fetched static.
    pub homepage_render_mode: RenderMode,
}

impl RunOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_catalog_pages: config.max_catalog_pages,
            catalog_page_size: config.catalog_page_size,
            inter_page_delay_ms: config.inter_page_delay_ms,
            max_competitors: config.max_competitors,
            competitor_discovery: config.competitor_discovery,
            run_deadline_secs: config.run_deadline_secs,
            brand_context_min_chars: config.brand_context_min_chars,
            brand_context_max_chars: config.brand_context_max_chars,
            fanout_width: config.fanout_width,
            homepage_render_mode: RenderMode::Static,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_catalog_pages: 20,
            catalog_page_size: 250,
            inter_page_delay_ms: 250,
            max_competitors: 5,
            competitor_discovery: false,
            run_deadline_secs: 120,
            brand_context_min_chars: 100,
            brand_context_max_chars: 1200,
            fanout_width: 4,
            homepage_render_mode: RenderMode::Static,
        }
    }
}

/// Bookkeeping for one run; travels alongside the aggregate, never inside it.
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub phase: RunPhase,
    /// One entry per absorbed extractor failure, `"extractor: reason"`.
    pub extractor_failures: Vec<String>,
    pub skipped_products: usize,
    pub duration: Duration,
}

/// Validates the target, fans out the extractors, optionally probes
/// competitors, and assembles the aggregate.
///
/// Validation is the only run-fatal stage; every later failure is absorbed
/// into an absent or empty aggregate field and tallied in the metadata.
///
/// # Errors
///
/// [`RunError`] when the target URL is malformed, unreachable, or carries no
/// storefront signature.
pub async fn run_insights(
    target_url: &str,
    fetcher: Arc<dyn PageFetcher>,
    competitor_source: Option<Arc<dyn CompetitorSource>>,
    options: &RunOptions,
) -> Result<(StoreInsights, RunMetadata), RunError> {
    let run_id = Uuid::new_v4();
    let started = std::time::Instant::now();
    let deadline = Instant::now() + Duration::from_secs(options.run_deadline_secs);
    let cache = PageCache::new(Arc::clone(&fetcher));

    tracing::debug!(%run_id, target_url, phase = %RunPhase::Validating, "run started");
    let store = match ValidatedStore::check(target_url, &cache).await {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!(%run_id, target_url, error = %err, phase = %RunPhase::Failed, "validation failed");
            return Err(err);
        }
    };
    let base_url = store.base_url().to_owned();

    tracing::debug!(%run_id, base_url, phase = %RunPhase::Extracting, "target validated");
    let mut failures: Vec<String> = Vec::new();

    let homepage_url = format!("{base_url}/");
    let homepage_html: String = match cache
        .get_or_fetch(&homepage_url, options.homepage_render_mode)
        .await
    {
        Ok(body) => body.to_string(),
        Err(err) => {
            let absorbed = ExtractError::PageFetchFailed {
                url: homepage_url,
                source: err,
            };
            tracing::warn!(%run_id, error = %absorbed, "homepage fetch failed; extractors degrade");
            failures.push(format!("homepage: {absorbed}"));
            String::new()
        }
    };

    // Wave 1: catalog (heroes chained behind it), policies, FAQs, brand
    // context. Independent tasks joined without cancellation.
    let catalog_options = CatalogOptions {
        max_pages: options.max_catalog_pages,
        page_size: options.catalog_page_size,
        inter_page_delay_ms: options.inter_page_delay_ms,
    };
    let (catalog_outcome, policies, faqs, brand_context_outcome) = tokio::join!(
        async {
            match catalog::pull_catalog(&base_url, &cache, &catalog_options).await {
                Ok(pull) => (pull, None),
                Err(err) => {
                    tracing::warn!(%run_id, error = %err, "catalog unavailable");
                    (CatalogPull::default(), Some(format!("catalog: {err}")))
                }
            }
        },
        extract::extract_policies(&base_url, &homepage_html, &cache),
        extract::extract_faqs(&base_url, &homepage_html, &cache),
        extract::extract_brand_context(
            &base_url,
            &homepage_html,
            &cache,
            options.brand_context_min_chars,
            options.brand_context_max_chars,
        ),
    );
    let (catalog_pull, catalog_failure) = catalog_outcome;
    if let Some(failure) = catalog_failure {
        failures.push(failure);
    }
    let brand_context = match brand_context_outcome {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!(%run_id, error = %err, "brand context absent");
            None
        }
    };

    let hero_products =
        extract::extract_hero_products(&homepage_html, &base_url, &catalog_pull.products);
    let brand_name = extract::extract_brand_name(&homepage_html, &base_url);
    let metadata_fragment = extract::extract_store_metadata(&homepage_html);

    // Wave 2: page-scanning extractors read the sorted cache snapshot so
    // their output is independent of fetch completion order.
    let pages = cache.snapshot().await;
    let social_handles = extract::extract_social_handles(&pages);
    let contact_info = extract::extract_contact_info(&base_url, &pages);
    let important_links = extract::extract_important_links(&base_url, &pages);

    let competitors = if options.competitor_discovery {
        match competitor_source {
            Some(source) => {
                tracing::debug!(%run_id, phase = %RunPhase::DiscoveringCompetitors, "probing competitors");
                discover_competitors(
                    &source,
                    &brand_name,
                    &catalog_pull.products,
                    &base_url,
                    Arc::clone(&fetcher),
                    options,
                    deadline,
                    &mut failures,
                )
                .await
            }
            None => {
                tracing::debug!(%run_id, "competitor discovery enabled but no source configured");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    tracing::debug!(%run_id, phase = %RunPhase::Aggregated, "assembling aggregate");
    let total_products = catalog_pull.products.len();
    let insights = StoreInsights {
        brand_name,
        website_url: base_url,
        products: catalog_pull.products,
        hero_products,
        policies,
        faqs,
        social_handles,
        contact_info,
        brand_context,
        important_links,
        competitors,
        scraped_at: Utc::now(),
        total_products,
        store_theme: metadata_fragment.theme,
        currency: metadata_fragment.currency,
        language: metadata_fragment.language,
    };

    let metadata = RunMetadata {
        run_id,
        phase: RunPhase::Done,
        extractor_failures: failures,
        skipped_products: catalog_pull.skipped_untitled,
        duration: started.elapsed(),
    };
    tracing::debug!(
        %run_id,
        phase = %metadata.phase,
        total_products,
        failures = metadata.extractor_failures.len(),
        duration_ms = u64::try_from(metadata.duration.as_millis()).unwrap_or(u64::MAX),
        "run finished"
    );

    Ok((insights, metadata))
}

#[allow(clippy::too_many_arguments)]
async fn discover_competitors(
    source: &Arc<dyn CompetitorSource>,
    brand_name: &str,
    products: &[shopsight_core::Product],
    base_url: &str,
    fetcher: Arc<dyn PageFetcher>,
    options: &RunOptions,
    deadline: Instant,
    failures: &mut Vec<String>,
) -> Vec<Competitor> {
    let category = competitor::dominant_category(products);
    let candidates = match source.candidates(brand_name, category.as_deref()).await {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(error = %err, "competitor source failed");
            failures.push(format!("competitors: {err}"));
            return Vec::new();
        }
    };

    let own_host = urlnorm::site_host(base_url).unwrap_or_default();
    competitor::probe_candidates(
        candidates,
        &own_host,
        options.max_competitors,
        options.fanout_width,
        deadline,
        |candidate| reduced_run(Arc::clone(&fetcher), candidate, options),
    )
    .await
}

/// Validator + catalog + brand context only, against a fresh cache. A failed
/// validation drops the candidate silently.
async fn reduced_run(
    fetcher: Arc<dyn PageFetcher>,
    candidate: CompetitorCandidate,
    options: &RunOptions,
) -> Option<Competitor> {
    let target = if candidate.domain.contains("://") {
        candidate.domain.clone()
    } else {
        format!("https://{}", candidate.domain)
    };

    let cache = PageCache::new(fetcher);
    let store = match ValidatedStore::check(&target, &cache).await {
        Ok(store) => store,
        Err(err) => {
            tracing::debug!(domain = %candidate.domain, error = %err, "candidate failed validation; dropped");
            return None;
        }
    };
    let base_url = store.base_url().to_owned();

    let homepage_html: String = cache
        .get_or_fetch(&format!("{base_url}/"), RenderMode::Static)
        .await
        .map(|body| body.to_string())
        .unwrap_or_default();

    let catalog_options = CatalogOptions {
        max_pages: options.max_catalog_pages,
        page_size: options.catalog_page_size,
        inter_page_delay_ms: options.inter_page_delay_ms,
    };
    let catalog_pull = catalog::pull_catalog(&base_url, &cache, &catalog_options)
        .await
        .unwrap_or_default();

    let brand_name = extract::extract_brand_name(&homepage_html, &base_url);
    let brand_context = extract::extract_brand_context(
        &base_url,
        &homepage_html,
        &cache,
        options.brand_context_min_chars,
        options.brand_context_max_chars,
    )
    .await
    .ok();

    let total_products = catalog_pull.products.len();
    let insights = StoreInsights {
        brand_name: brand_name.clone(),
        website_url: base_url.clone(),
        products: catalog_pull.products,
        hero_products: Vec::new(),
        policies: Policies::new(),
        faqs: Vec::new(),
        social_handles: Vec::new(),
        contact_info: ContactInfo::default(),
        brand_context,
        important_links: Vec::new(),
        competitors: Vec::new(),
        scraped_at: Utc::now(),
        total_products,
        store_theme: None,
        currency: None,
        language: None,
    };

    Some(Competitor {
        name: if candidate.name.trim().is_empty() {
            brand_name
        } else {
            candidate.name
        },
        website_url: base_url,
        description: candidate.description,
        insights: Some(Box::new(insights)),
    })
}
