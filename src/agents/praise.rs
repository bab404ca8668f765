//! Praise path: a short thank-you in the creator's voice.

use super::{vars, StageClient};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::exemplars::StyleExemplars;
use crate::llm::{CompletionService, StageKind};
use crate::resource::Resource;
use std::sync::Arc;
use tracing::instrument;

/// Replies to praise, styled after the exemplars it was built with.
pub struct PraiseResponder {
    stage: StageClient,
    exemplars: Resource<StyleExemplars>,
}

impl PraiseResponder {
    pub fn new(
        service: Arc<dyn CompletionService>,
        settings: &Settings,
        prompts: &Prompts,
        exemplars: Resource<StyleExemplars>,
    ) -> Self {
        Self {
            stage: StageClient::new(StageKind::Praise, service, settings, prompts),
            exemplars,
        }
    }

    #[instrument(skip(self, comment))]
    pub async fn respond(&self, comment: &str) -> Result<String> {
        let exemplars = self.exemplars.get()?.format_for_prompt();
        self.stage
            .run(&vars([("comment", comment), ("exemplars", exemplars.as_str())]))
            .await
    }
}
