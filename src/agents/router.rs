//! Router stage: question or praise?

use super::{vars, Route, StageClient};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::{CompletionService, StageKind};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sorts accepted comments into exactly one branch.
pub struct RouterAgent {
    stage: StageClient,
}

impl RouterAgent {
    pub fn new(service: Arc<dyn CompletionService>, settings: &Settings, prompts: &Prompts) -> Self {
        Self {
            stage: StageClient::new(StageKind::Router, service, settings, prompts),
        }
    }

    /// Route a comment. Question intent wins: any comment with a question mark is a
    /// question, whatever praise it also contains.
    #[instrument(skip(self, comment))]
    pub async fn classify(&self, comment: &str) -> Result<Route> {
        if asks_question(comment) {
            debug!("Comment contains a question mark, routing to question");
            return Ok(Route::Question);
        }

        let output = self.stage.run(&vars([("comment", comment)])).await?;
        let route = Route::parse(&output)?;
        debug!(%route, "Router decision");
        Ok(route)
    }
}

fn asks_question(comment: &str) -> bool {
    comment.contains('?') || comment.contains('？')
}
