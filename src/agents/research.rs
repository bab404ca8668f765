//! Research fan-out: web search and transcript lookup, run concurrently and joined.

use super::{vars, StageClient};
use crate::config::{Prompts, Settings, NO_RELEVANT_RESULTS};
use crate::error::Result;
use crate::llm::{CompletionService, StageKind};
use crate::transcript::TranscriptSearch;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// External web search tool.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web. `Ok(None)` means nothing relevant was found.
    async fn search(&self, query: &str) -> Result<Option<String>>;
}

/// Web search through a search-capable chat model.
pub struct LlmWebSearch {
    stage: StageClient,
}

impl LlmWebSearch {
    pub fn new(service: Arc<dyn CompletionService>, settings: &Settings, prompts: &Prompts) -> Self {
        Self {
            stage: StageClient::new(StageKind::WebSearch, service, settings, prompts),
        }
    }
}

#[async_trait]
impl WebSearch for LlmWebSearch {
    async fn search(&self, query: &str) -> Result<Option<String>> {
        let output = self.stage.run(&vars([("question", query)])).await?;
        let trimmed = output.trim();
        if trimmed.is_empty() || trimmed.starts_with(NO_RELEVANT_RESULTS) {
            return Ok(None);
        }
        Ok(Some(output))
    }
}

/// Web search turned off in config. Never finds anything.
pub struct DisabledWebSearch;

#[async_trait]
impl WebSearch for DisabledWebSearch {
    async fn search(&self, _query: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// What one research source produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Finding {
    Found(String),
    NotFound,
    Failed(String),
}

impl Finding {
    pub fn text(&self) -> Option<&str> {
        match self {
            Finding::Found(text) => Some(text.as_str()),
            Finding::NotFound | Finding::Failed(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.text().is_some()
    }

    /// Why there is no text, if there isn't.
    pub fn gap_reason(&self) -> Option<String> {
        match self {
            Finding::Found(_) => None,
            Finding::NotFound => Some("no relevant results".to_string()),
            Finding::Failed(reason) => Some(format!("lookup failed: {}", reason)),
        }
    }

    /// Text for the synthesis prompt; an explicit placeholder when empty.
    pub fn for_prompt(&self) -> String {
        match (self.text(), self.gap_reason()) {
            (Some(text), _) => text.to_string(),
            (None, Some(reason)) => format!("(none: {})", reason),
            (None, None) => String::new(),
        }
    }
}

/// Findings from both sources for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchResult {
    pub web: Finding,
    pub transcript: Finding,
}

/// Runs both lookups for a question.
pub struct Researcher {
    web: Arc<dyn WebSearch>,
    transcripts: Arc<TranscriptSearch>,
}

impl Researcher {
    pub fn new(web: Arc<dyn WebSearch>, transcripts: Arc<TranscriptSearch>) -> Self {
        Self { web, transcripts }
    }

    /// Run both lookups concurrently and wait for both.
    ///
    /// A failing source becomes [`Finding::Failed`]; it never aborts the other one.
    #[instrument(skip(self, question))]
    pub async fn research(&self, question: &str) -> ResearchResult {
        let web = async {
            match self.web.search(question).await {
                Ok(Some(text)) => Finding::Found(text),
                Ok(None) => Finding::NotFound,
                Err(e) => {
                    warn!("Web search failed: {}", e);
                    Finding::Failed(e.to_string())
                }
            }
        };

        let transcript = async {
            match self.transcripts.search(question) {
                Ok(matches) if matches.is_empty() => Finding::NotFound,
                Ok(matches) => Finding::Found(matches.format_for_prompt()),
                Err(e) => {
                    warn!("Transcript lookup failed: {}", e);
                    Finding::Failed(e.to_string())
                }
            }
        };

        let (web, transcript) = tokio::join!(web, transcript);
        debug!(
            web = web.is_available(),
            transcript = transcript.is_available(),
            "Research complete"
        );

        ResearchResult { web, transcript }
    }
}
