//! Filter stage: does a comment deserve a reply at all?

use super::{vars, FilterDecision, StageClient};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::{CompletionService, StageKind};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Lenient accept/ignore classifier.
pub struct FilterAgent {
    stage: StageClient,
}

impl FilterAgent {
    pub fn new(service: Arc<dyn CompletionService>, settings: &Settings, prompts: &Prompts) -> Self {
        Self {
            stage: StageClient::new(StageKind::Filter, service, settings, prompts),
        }
    }

    /// Classify a comment.
    ///
    /// Comments without a single letter or digit (empty, whitespace, emoji only) are
    /// ignored without asking the model.
    #[instrument(skip(self, comment))]
    pub async fn classify(&self, comment: &str) -> Result<FilterDecision> {
        if !has_text(comment) {
            debug!("Comment has no text, ignoring");
            return Ok(FilterDecision::Ignore);
        }

        let output = self.stage.run(&vars([("comment", comment)])).await?;
        let decision = FilterDecision::parse(&output)?;
        debug!(%decision, "Filter decision");
        Ok(decision)
    }
}

fn has_text(comment: &str) -> bool {
    comment.chars().any(char::is_alphanumeric)
}
