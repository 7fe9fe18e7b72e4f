use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable carries an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a variable carries an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let log_level = or_default("SHOPSIGHT_LOG_LEVEL", "info");
    let user_agent = or_default(
        "SHOPSIGHT_USER_AGENT",
        "shopsight/0.1 (storefront-insights)",
    );
    let fetch_timeout_secs = parse_u64("SHOPSIGHT_FETCH_TIMEOUT_SECS", "20")?;
    let max_retries = parse_u32("SHOPSIGHT_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("SHOPSIGHT_RETRY_BACKOFF_BASE_MS", "300")?;
    let max_catalog_pages = parse_usize("SHOPSIGHT_MAX_CATALOG_PAGES", "20")?;
    let catalog_page_size = parse_u32("SHOPSIGHT_CATALOG_PAGE_SIZE", "250")?;
    let inter_page_delay_ms = parse_u64("SHOPSIGHT_INTER_PAGE_DELAY_MS", "250")?;
    let max_competitors = parse_usize("SHOPSIGHT_MAX_COMPETITORS", "5")?;
    let competitor_discovery = parse_bool("SHOPSIGHT_COMPETITOR_DISCOVERY", "false")?;
    let competitor_api_key = lookup("SHOPSIGHT_COMPETITOR_API_KEY").ok();
    let run_deadline_secs = parse_u64("SHOPSIGHT_RUN_DEADLINE_SECS", "120")?;
    let brand_context_min_chars = parse_usize("SHOPSIGHT_BRAND_CONTEXT_MIN_CHARS", "100")?;
    let brand_context_max_chars = parse_usize("SHOPSIGHT_BRAND_CONTEXT_MAX_CHARS", "1200")?;
    let fanout_width = parse_usize("SHOPSIGHT_FANOUT_WIDTH", "4")?;

    Ok(AppConfig {
        log_level,
        user_agent,
        fetch_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        max_catalog_pages,
        catalog_page_size,
        inter_page_delay_ms,
        max_competitors,
        competitor_discovery,
        competitor_api_key,
        run_deadline_secs,
        brand_context_min_chars,
        brand_context_max_chars,
        fanout_width,
    })
}
