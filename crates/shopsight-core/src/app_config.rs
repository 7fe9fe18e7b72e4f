/// Process-wide configuration for the extraction pipeline.
///
/// Built once at startup from `SHOPSIGHT_*` environment variables (see
/// [`crate::config`]). Run options are derived from this but passed explicitly
/// into the orchestrator, so concurrent runs can use different settings.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_catalog_pages: usize,
    pub catalog_page_size: u32,
    pub inter_page_delay_ms: u64,
    pub max_competitors: usize,
    pub competitor_discovery: bool,
    pub competitor_api_key: Option<String>,
    pub run_deadline_secs: u64,
    pub brand_context_min_chars: usize,
    pub brand_context_max_chars: usize,
    pub fanout_width: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_catalog_pages", &self.max_catalog_pages)
            .field("catalog_page_size", &self.catalog_page_size)
            .field("inter_page_delay_ms", &self.inter_page_delay_ms)
            .field("max_competitors", &self.max_competitors)
            .field("competitor_discovery", &self.competitor_discovery)
            .field(
                "competitor_api_key",
                &self.competitor_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("run_deadline_secs", &self.run_deadline_secs)
            .field("brand_context_min_chars", &self.brand_context_min_chars)
            .field("brand_context_max_chars", &self.brand_context_max_chars)
            .field("fanout_width", &self.fanout_width)
            .finish()
    }
}
