//! Pipeline coordinator for Commentary.
//!
//! Runs one comment through filter, router and the chosen branch, and hands back the
//! branch's text exactly as it was produced.

use crate::agents::{
    DisabledWebSearch, FilterAgent, FilterDecision, LlmWebSearch, PraiseResponder,
    QuestionResponder, Researcher, Route, RouterAgent, Synthesizer, WebSearch,
};
use crate::config::{Prompts, Settings};
use crate::error::{CommentaryError, Result};
use crate::exemplars::StyleExemplars;
use crate::llm::{CompletionService, OpenAICompletion, RetryPolicy};
use crate::resource::Resource;
use crate::transcript::TranscriptSearch;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The terminal text of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FinalResponse(String);

impl FinalResponse {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for FinalResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a pipeline run currently is.
#[derive(Debug)]
enum PipelineState {
    Start,
    Filtered(FilterDecision),
    Routed(Route),
    Responding(String),
    Done(FinalResponse),
}

/// Everything a finished run decided and produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub filter: FilterDecision,
    pub route: Option<Route>,
    pub response: FinalResponse,
}

impl PipelineOutcome {
    /// True when the filter decided no reply was needed.
    pub fn ignored(&self) -> bool {
        self.filter == FilterDecision::Ignore
    }
}

/// The main coordinator for the comment pipeline.
pub struct Coordinator {
    filter: FilterAgent,
    router: RouterAgent,
    praise: PraiseResponder,
    researcher: Researcher,
    synthesizer: Synthesizer,
    question: QuestionResponder,
    ignore_message: String,
    deadline: Option<Duration>,
}

impl Coordinator {
    /// Create a coordinator from settings: reads the API key, prompts, transcripts and exemplars.
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.api_key()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let service: Arc<dyn CompletionService> = Arc::new(OpenAICompletion::new(
            &settings.llm,
            api_key,
            RetryPolicy::try_from(&settings.retry)?,
        )?);

        let web: Arc<dyn WebSearch> = if settings.search.enabled {
            info!("Web search enabled ({})", settings.search.model);
            Arc::new(LlmWebSearch::new(service.clone(), settings, &prompts))
        } else {
            info!("Web search disabled");
            Arc::new(DisabledWebSearch)
        };

        let transcripts = Arc::new(TranscriptSearch::open(&settings.transcripts_path()));

        let exemplars = Resource::from_result(StyleExemplars::load(&settings.exemplars_path()));
        if let Resource::Unavailable(reason) = &exemplars {
            warn!("Style exemplars unavailable: {}", reason);
        }

        Ok(Self::with_components(
            settings, &prompts, service, web, transcripts, exemplars,
        ))
    }

    /// Create a coordinator with custom components.
    pub fn with_components(
        settings: &Settings,
        prompts: &Prompts,
        service: Arc<dyn CompletionService>,
        web: Arc<dyn WebSearch>,
        transcripts: Arc<TranscriptSearch>,
        exemplars: Resource<StyleExemplars>,
    ) -> Self {
        Self {
            filter: FilterAgent::new(service.clone(), settings, prompts),
            router: RouterAgent::new(service.clone(), settings, prompts),
            praise: PraiseResponder::new(service.clone(), settings, prompts, exemplars.clone()),
            researcher: Researcher::new(web, transcripts),
            synthesizer: Synthesizer::new(service.clone(), settings, prompts),
            question: QuestionResponder::new(service, settings, prompts, exemplars),
            ignore_message: settings.pipeline.ignore_message.clone(),
            deadline: settings.pipeline.deadline(),
        }
    }

    /// Process one comment end to end, within the configured deadline.
    #[instrument(skip(self, comment), fields(run_id = tracing::field::Empty))]
    pub async fn process(&self, comment: &str) -> Result<PipelineOutcome> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(run_id, comment))
                .await
                .map_err(|_| CommentaryError::DeadlineExceeded(deadline.as_secs()))?,
            None => self.run(run_id, comment).await,
        }
    }

    async fn run(&self, run_id: Uuid, comment: &str) -> Result<PipelineOutcome> {
        let mut state = PipelineState::Start;
        let mut filter = None;
        let mut route = None;

        loop {
            state = match state {
                PipelineState::Start => {
                    let decision = self.filter.classify(comment).await?;
                    filter = Some(decision);
                    PipelineState::Filtered(decision)
                }
                PipelineState::Filtered(FilterDecision::Ignore) => {
                    info!("Comment ignored");
                    PipelineState::Done(FinalResponse(self.ignore_message.clone()))
                }
                PipelineState::Filtered(FilterDecision::Accept) => {
                    let decision = self.router.classify(comment).await?;
                    route = Some(decision);
                    PipelineState::Routed(decision)
                }
                PipelineState::Routed(decision) => {
                    info!(route = %decision, "Dispatching comment");
                    PipelineState::Responding(self.dispatch(decision, comment).await?)
                }
                PipelineState::Responding(text) => PipelineState::Done(FinalResponse(text)),
                PipelineState::Done(response) => {
                    let filter = filter.ok_or_else(|| {
                        CommentaryError::InvalidInput("pipeline finished without a filter decision".to_string())
                    })?;
                    return Ok(PipelineOutcome {
                        run_id,
                        filter,
                        route,
                        response,
                    });
                }
            };
        }
    }

    async fn dispatch(&self, route: Route, comment: &str) -> Result<String> {
        match route {
            Route::Praise => self.praise.respond(comment).await,
            Route::Question => self.answer_question(comment).await,
        }
    }

    /// Research, synthesize, answer.
    async fn answer_question(&self, question: &str) -> Result<String> {
        let research = self.researcher.research(question).await;
        let summary = self.synthesizer.synthesize(&research, question).await?;
        self.question.respond(question, &summary).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exemplars::Exemplar;
    use crate::llm::testing::ScriptedService;
    use crate::llm::{CompletionRequest, StageKind};
    use crate::transcript::TranscriptCorpus;
    use async_trait::async_trait;

    const CORPUS: &str = "Welcome back everyone.\n\n\
        In this video: a good GATE score for IIT M.Tech is anything above 700.\n\n\
        Stipend is paid only once.";

    struct StubWebSearch(Option<String>);

    #[async_trait]
    impl WebSearch for StubWebSearch {
        async fn search(&self, _query: &str) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    fn exemplars() -> Resource<StyleExemplars> {
        Resource::from(StyleExemplars::new(vec![Exemplar {
            input: "Thank You Sir!".to_string(),
            output: "You are most welcome!".to_string(),
        }]))
    }

    fn coordinator_with(
        settings: &Settings,
        service: Arc<ScriptedService>,
        web: Option<&str>,
        transcripts: TranscriptSearch,
    ) -> Coordinator {
        Coordinator::with_components(
            settings,
            &Prompts::default(),
            service,
            Arc::new(StubWebSearch(web.map(str::to_string))),
            Arc::new(transcripts),
            exemplars(),
        )
    }

    fn coordinator(service: Arc<ScriptedService>, web: Option<&str>) -> Coordinator {
        coordinator_with(
            &Settings::default(),
            service,
            web,
            TranscriptSearch::from_corpus(TranscriptCorpus::from_text(CORPUS)),
        )
    }

    /// Accepts everything, routes by a keyword, and echoes the brief in the answer.
    fn scripted(praise_reply: &'static str) -> ScriptedService {
        ScriptedService::new(move |req: &CompletionRequest| match req.stage {
            StageKind::Filter => Ok("ACCEPT".to_string()),
            StageKind::Router => Ok("Praise".to_string()),
            StageKind::Praise => Ok(praise_reply.to_string()),
            StageKind::Synthesis => {
                if req.user.contains("above 700") {
                    Ok("Per the channel's video, a good GATE score is above 700. \
                        A web source claims 500, which contradicts the video."
                        .to_string())
                } else {
                    Ok("NO_INFORMATION".to_string())
                }
            }
            StageKind::Question => {
                let brief = req.user.split("Research brief:\n").nth(1).unwrap_or_default();
                Ok(format!("Answer from brief: {}", brief))
            }
            StageKind::WebSearch => Ok("NO_RELEVANT_RESULTS".to_string()),
        })
    }

    #[tokio::test]
    async fn test_praise_scenario() {
        let service = Arc::new(scripted("Glad it helped! 😊"));
        let outcome = coordinator(service.clone(), None)
            .process("Thanks for the great video!")
            .await
            .unwrap();

        assert_eq!(outcome.filter, FilterDecision::Accept);
        assert_eq!(outcome.route, Some(Route::Praise));
        assert_eq!(outcome.response.as_str(), "Glad it helped! 😊");
        assert_ne!(outcome.response.as_str(), Settings::default().pipeline.fallback_message);
        assert_eq!(
            service.stages(),
            vec![StageKind::Filter, StageKind::Router, StageKind::Praise]
        );
    }

    #[tokio::test]
    async fn test_empty_comment_gets_canned_message() {
        let service = Arc::new(scripted("unused"));
        let outcome = coordinator(service.clone(), None).process("").await.unwrap();

        assert!(outcome.ignored());
        assert_eq!(outcome.route, None);
        assert_eq!(outcome.response.as_str(), "This comment doesn't need a response.");
        assert!(service.stages().is_empty());
    }

    #[tokio::test]
    async fn test_question_scenario_prefers_transcript() {
        let service = Arc::new(scripted("unused"));
        let outcome = coordinator(service.clone(), Some("A web forum says 500 is a good GATE score."))
            .process("What is a good GATE score?")
            .await
            .unwrap();

        assert_eq!(outcome.route, Some(Route::Question));
        assert!(outcome.response.as_str().contains("above 700"));

        let synthesis = service.request_for(StageKind::Synthesis).unwrap();
        assert!(synthesis.user.contains("a good GATE score for IIT M.Tech is anything above 700"));
        assert!(synthesis.user.contains("A web forum says 500"));
        assert!(synthesis.system.contains("the transcript wins"));
        assert_eq!(
            service.stages(),
            vec![StageKind::Filter, StageKind::Synthesis, StageKind::Question]
        );
    }

    #[tokio::test]
    async fn test_missing_corpus_still_answers_from_web() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(ScriptedService::new(|req| match req.stage {
            StageKind::Filter => Ok("ACCEPT".to_string()),
            StageKind::Synthesis => Ok("Web: cutoffs are about 750.".to_string()),
            StageKind::Question => Ok(req.user.clone()),
            _ => Ok("unexpected".to_string()),
        }));

        let outcome = coordinator_with(
            &Settings::default(),
            service,
            Some("cutoffs are about 750"),
            TranscriptSearch::open(&dir.path().join("Video transcripts.txt")),
        )
        .process("What is the IIT Bombay cutoff?")
        .await
        .unwrap();

        let text = outcome.response.as_str();
        assert!(text.contains("Web: cutoffs are about 750."));
        assert!(text.contains("Information gaps:"));
        assert!(text.contains("No transcript data (lookup failed:"));
    }

    #[tokio::test]
    async fn test_no_information_anywhere_yields_fallback() {
        let service = Arc::new(scripted("unused"));
        let outcome = coordinator(service.clone(), None)
            .process("Which laptop do you use?")
            .await
            .unwrap();

        assert_eq!(
            outcome.response.as_str(),
            Settings::default().pipeline.fallback_message
        );
        assert!(!service.stages().contains(&StageKind::Question));
    }

    #[tokio::test]
    async fn test_branch_output_passes_through_byte_for_byte() {
        let odd = "  Haan bhai 👍 — GATE में 700+ safe hai?!\n\t(trailing)  \n";
        for route in ["Praise", "Question"] {
            let service = Arc::new(ScriptedService::new(move |req| match req.stage {
                StageKind::Filter => Ok("ACCEPT".to_string()),
                StageKind::Router => Ok(route.to_string()),
                StageKind::Synthesis => Ok("Brief with facts.".to_string()),
                _ => Ok(odd.to_string()),
            }));

            let outcome = coordinator(service, Some("web facts"))
                .process("Sir GATE score for IIT")
                .await
                .unwrap();
            assert_eq!(outcome.response.as_str().as_bytes(), odd.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_question_mark_with_gratitude_never_praise() {
        let service = Arc::new(scripted("praise reply"));
        let outcome = coordinator(service.clone(), None)
            .process("Thanks a lot! What is a good GATE score?")
            .await
            .unwrap();

        assert_eq!(outcome.route, Some(Route::Question));
        assert!(!service.stages().contains(&StageKind::Praise));
    }

    #[tokio::test]
    async fn test_stage_failure_aborts_run() {
        let service = Arc::new(ScriptedService::new(|req| match req.stage {
            StageKind::Filter => Ok("ACCEPT".to_string()),
            _ => Err(CommentaryError::RetryExhausted {
                attempts: 5,
                last_error: "HTTP 503".to_string(),
            }),
        }));

        let err = coordinator(service, None).process("Love your teaching style").await.unwrap_err();
        assert!(matches!(err, CommentaryError::RetryExhausted { .. }));
    }

    #[tokio::test]
    async fn test_malformed_label_aborts_run() {
        let service = Arc::new(ScriptedService::constant("Sure! Happy to help."));
        let err = coordinator(service, None).process("nice").await.unwrap_err();
        assert!(matches!(err, CommentaryError::MalformedOutput { .. }));
    }

    struct SlowService;

    #[async_trait]
    impl CompletionService for SlowService {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("ACCEPT".to_string())
        }
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let mut settings = Settings::default();
        settings.pipeline.deadline_seconds = 1;

        let coordinator = Coordinator::with_components(
            &settings,
            &Prompts::default(),
            Arc::new(SlowService),
            Arc::new(DisabledWebSearch),
            Arc::new(TranscriptSearch::from_corpus(TranscriptCorpus::from_text(CORPUS))),
            exemplars(),
        );

        let err = coordinator.process("hello there").await.unwrap_err();
        assert!(matches!(err, CommentaryError::DeadlineExceeded(1)));
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let service = Arc::new(scripted("Glad it helped!"));
        let coordinator = coordinator(service, None);

        let (a, b) = tokio::join!(
            coordinator.process("Great explanation!"),
            coordinator.process("")
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.response.as_str(), "Glad it helped!");
        assert!(b.ignored());
    }
}
