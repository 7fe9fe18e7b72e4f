pub mod catalog;
pub mod competitor;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod html;
pub mod orchestrator;
pub mod summarize;
pub mod urlnorm;
pub mod validate;

pub use competitor::{CompetitorCandidate, CompetitorSource};
pub use error::{ExtractError, RunError};
pub use fetch::{FetchError, HttpFetcher, PageCache, PageFetcher, RenderMode};
pub use orchestrator::{run_insights, RunMetadata, RunOptions, RunPhase};
pub use summarize::Summarizer;
pub use validate::ValidatedStore;
