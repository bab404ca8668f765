//! The pipeline stages.
//!
//! Each stage renders its prompt template, makes one call to the completion service
//! and interprets the reply. Deterministic guards short-circuit the call where the
//! answer does not need a model.

mod decision;
mod filter;
mod praise;
mod question;
mod research;
mod router;
mod synthesis;

pub use decision::{FilterDecision, Route};
pub use filter::FilterAgent;
pub use praise::PraiseResponder;
pub use question::QuestionResponder;
pub use research::{
    DisabledWebSearch, Finding, LlmWebSearch, ResearchResult, Researcher, WebSearch,
};
pub use router::RouterAgent;
pub use synthesis::{SynthesizedSummary, Synthesizer};

use crate::config::{Prompts, Settings, StagePrompt};
use crate::error::Result;
use crate::llm::{CompletionRequest, CompletionService, StageKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One prompt template bound to a model and the completion service.
pub(crate) struct StageClient {
    kind: StageKind,
    service: Arc<dyn CompletionService>,
    model: String,
    prompt: StagePrompt,
    variables: HashMap<String, String>,
    temperature: Option<f32>,
}

impl StageClient {
    pub(crate) fn new(
        kind: StageKind,
        service: Arc<dyn CompletionService>,
        settings: &Settings,
        prompts: &Prompts,
    ) -> Self {
        let temperature = match kind {
            StageKind::Filter | StageKind::Router => Some(0.0),
            StageKind::Synthesis => Some(0.2),
            StageKind::Praise | StageKind::Question => Some(0.7),
            StageKind::WebSearch => None,
        };

        Self {
            kind,
            service,
            model: settings.model_for(kind),
            prompt: prompts.stage(kind).clone(),
            variables: prompts.variables.clone(),
            temperature,
        }
    }

    /// Render the templates with `vars` and run the completion.
    pub(crate) async fn run(&self, vars: &HashMap<String, String>) -> Result<String> {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }

        let request = CompletionRequest {
            stage: self.kind,
            model: self.model.clone(),
            system: Prompts::render(&self.prompt.system, &merged),
            user: Prompts::render(&self.prompt.user, &merged),
            temperature: self.temperature,
        };

        debug!(stage = %self.kind, model = %self.model, "Calling completion service");
        self.service.complete(&request).await
    }
}

/// Build a variable map from key/value pairs.
pub(crate) fn vars<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
