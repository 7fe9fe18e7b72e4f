//! Optional prose-summarization seam.
//!
//! The aggregate is complete without it; a surrounding application layer may
//! plug in a backend (LLM, template engine) behind this trait.

use async_trait::async_trait;
use shopsight_core::StoreInsights;
use thiserror::Error;

/// One prose section of a rendered summary.
#[derive(Debug, Clone)]
pub struct SummarySection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarization backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("summarization failed: {reason}")]
    Failed { reason: String },
}

/// Turns a finished aggregate into prose sections.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        insights: &StoreInsights,
    ) -> Result<Vec<SummarySection>, SummarizeError>;
}
