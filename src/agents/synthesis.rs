//! Synthesis stage: one brief from both research sources.

use super::{vars, ResearchResult, StageClient};
use crate::config::{Prompts, Settings, NO_INFORMATION};
use crate::error::Result;
use crate::llm::{CompletionService, StageKind};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Research brief handed to the question responder. Opaque text downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSummary {
    text: String,
}

impl SynthesizedSummary {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when the brief is empty or says there is nothing to go on.
    pub fn is_no_information(&self) -> bool {
        let trimmed = self.text.trim();
        trimmed.is_empty()
            || trimmed.starts_with(NO_INFORMATION)
            || trimmed.to_lowercase().starts_with("no information")
    }
}

/// Merges web and transcript findings, preferring the transcripts.
pub struct Synthesizer {
    stage: StageClient,
}

impl Synthesizer {
    pub fn new(service: Arc<dyn CompletionService>, settings: &Settings, prompts: &Prompts) -> Self {
        Self {
            stage: StageClient::new(StageKind::Synthesis, service, settings, prompts),
        }
    }

    /// Build the brief.
    ///
    /// With both sources empty the model is not called and the brief says so. With
    /// one source empty, the missing source is listed under "Information gaps".
    #[instrument(skip(self, research, question))]
    pub async fn synthesize(
        &self,
        research: &ResearchResult,
        question: &str,
    ) -> Result<SynthesizedSummary> {
        let gaps = gaps(research);

        if !research.web.is_available() && !research.transcript.is_available() {
            debug!("Neither source returned anything");
            return Ok(SynthesizedSummary::new(format!(
                "{}\n{}",
                NO_INFORMATION,
                gaps.join("\n")
            )));
        }

        let transcript_results = research.transcript.for_prompt();
        let web_results = research.web.for_prompt();
        let text = self
            .stage
            .run(&vars([
                ("question", question),
                ("transcript_results", transcript_results.as_str()),
                ("web_results", web_results.as_str()),
            ]))
            .await?;

        let mut summary = SynthesizedSummary::new(text);
        if !gaps.is_empty() && !summary.is_no_information() {
            summary.text = format!(
                "{}\n\nInformation gaps:\n{}",
                summary.text.trim_end(),
                gaps.iter().map(|g| format!("- {}", g)).collect::<Vec<_>>().join("\n")
            );
        }

        Ok(summary)
    }
}

fn gaps(research: &ResearchResult) -> Vec<String> {
    let mut gaps = Vec::new();
    if let Some(reason) = research.transcript.gap_reason() {
        gaps.push(format!("No transcript data ({})", reason));
    }
    if let Some(reason) = research.web.gap_reason() {
        gaps.push(format!("No web search data ({})", reason));
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Finding;
    use crate::llm::testing::ScriptedService;

    fn synthesizer(service: Arc<ScriptedService>) -> Synthesizer {
        Synthesizer::new(service, &Settings::default(), &Prompts::default())
    }

    #[tokio::test]
    async fn test_both_sources_empty_skips_model() {
        let service = Arc::new(ScriptedService::constant("should not be called"));
        let research = ResearchResult {
            web: Finding::Failed("HTTP 503".to_string()),
            transcript: Finding::NotFound,
        };

        let summary = synthesizer(service.clone()).synthesize(&research, "q?").await.unwrap();
        assert!(summary.is_no_information());
        assert!(summary.as_str().contains("No transcript data (no relevant results)"));
        assert!(summary.as_str().contains("No web search data (lookup failed: HTTP 503)"));
        assert!(service.stages().is_empty());
    }

    #[tokio::test]
    async fn test_missing_transcript_is_flagged() {
        let service = Arc::new(ScriptedService::constant("Cutoffs are around 750.\n"));
        let research = ResearchResult {
            web: Finding::Found("Cutoffs are around 750.".to_string()),
            transcript: Finding::Failed("Transcripts file not found at /data/t.txt".to_string()),
        };

        let summary = synthesizer(service.clone()).synthesize(&research, "cutoff?").await.unwrap();
        assert_eq!(
            summary.as_str(),
            "Cutoffs are around 750.\n\nInformation gaps:\n\
             - No transcript data (lookup failed: Transcripts file not found at /data/t.txt)"
        );

        let request = service.request_for(StageKind::Synthesis).unwrap();
        assert!(request.user.contains("(none: lookup failed: Transcripts file not found"));
    }

    #[tokio::test]
    async fn test_both_sources_pass_through_untouched() {
        let service = Arc::new(ScriptedService::constant("Brief."));
        let research = ResearchResult {
            web: Finding::Found("web says 650".to_string()),
            transcript: Finding::Found("[1] video says 700".to_string()),
        };

        let summary = synthesizer(service.clone()).synthesize(&research, "score?").await.unwrap();
        assert_eq!(summary.as_str(), "Brief.");

        let request = service.request_for(StageKind::Synthesis).unwrap();
        assert!(request.system.contains("the transcript wins"));
        let transcript_at = request.user.find("video says 700").unwrap();
        let web_at = request.user.find("web says 650").unwrap();
        assert!(transcript_at < web_at);
    }

    #[test]
    fn test_no_information_detection() {
        assert!(SynthesizedSummary::new("").is_no_information());
        assert!(SynthesizedSummary::new("  \n").is_no_information());
        assert!(SynthesizedSummary::new("NO_INFORMATION").is_no_information());
        assert!(SynthesizedSummary::new("No information was found.").is_no_information());
        assert!(!SynthesizedSummary::new("Score above 700 is good.").is_no_information());
    }
}
