pub mod app_config;
pub mod config;
pub mod insights;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use insights::{
    Competitor, ContactInfo, Faq, ImportantLink, Policies, PolicyKind, Product, SocialHandle,
    SocialPlatform, StoreInsights,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
