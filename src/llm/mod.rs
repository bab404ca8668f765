//! Access to the external text-completion service.
//!
//! Every classification and generation stage goes through the [`CompletionService`]
//! trait, which returns exactly one text result or a terminal error per call.

mod openai;
mod retry;

pub use openai::{create_http_client, OpenAICompletion};
pub use retry::{retry_with_backoff, RetryPolicy};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The pipeline stage a completion request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Filter,
    Router,
    Praise,
    WebSearch,
    Synthesis,
    Question,
}

impl StageKind {
    /// Short name used in config keys, prompt files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Filter => "filter",
            StageKind::Router => "router",
            StageKind::Praise => "praise",
            StageKind::WebSearch => "search",
            StageKind::Synthesis => "synthesis",
            StageKind::Question => "question",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single rendered chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub stage: StageKind,
    pub model: String,
    pub system: String,
    pub user: String,
    /// Sampling temperature; `None` leaves it to the model (search models reject it).
    pub temperature: Option<f32>,
}

/// Trait for the external text-completion service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return its text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
