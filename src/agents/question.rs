//! Question path: answer from the research brief, or admit there is nothing to go on.

use super::{vars, StageClient, SynthesizedSummary};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::exemplars::StyleExemplars;
use crate::llm::{CompletionService, StageKind};
use crate::resource::Resource;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Writes the final answer to a question.
pub struct QuestionResponder {
    stage: StageClient,
    exemplars: Resource<StyleExemplars>,
    fallback: String,
}

impl QuestionResponder {
    pub fn new(
        service: Arc<dyn CompletionService>,
        settings: &Settings,
        prompts: &Prompts,
        exemplars: Resource<StyleExemplars>,
    ) -> Self {
        Self {
            stage: StageClient::new(StageKind::Question, service, settings, prompts),
            exemplars,
            fallback: settings.pipeline.fallback_message.clone(),
        }
    }

    /// The reply used when the brief cannot answer the question.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Answer `question` using only `summary`.
    #[instrument(skip(self, question, summary))]
    pub async fn respond(&self, question: &str, summary: &SynthesizedSummary) -> Result<String> {
        if summary.is_no_information() {
            debug!("Brief has no information, using fallback");
            return Ok(self.fallback.clone());
        }

        let exemplars = self.exemplars.get()?.format_for_prompt();
        let output = self
            .stage
            .run(&vars([
                ("question", question),
                ("summary", summary.as_str()),
                ("exemplars", exemplars.as_str()),
                ("fallback", self.fallback.as_str()),
            ]))
            .await?;

        if output.trim() == self.fallback.trim() {
            return Ok(self.fallback.clone());
        }
        Ok(output)
    }
}
