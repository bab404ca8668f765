//! OpenAI-compatible chat completion client.
//!
//! Requests and responses use the `async-openai` wire types, but are sent through our
//! own `reqwest` client so the HTTP status of a failure reaches the retry policy.

use super::{retry_with_backoff, CompletionRequest, CompletionService, RetryPolicy};
use crate::config::LlmSettings;
use crate::error::{CommentaryError, Result};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Create an HTTP client with the given request timeout.
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Completion service backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAICompletion {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl OpenAICompletion {
    /// Create a client. The API key is injected here and never read from the environment later.
    pub fn new(settings: &LlmSettings, api_key: String, retry: RetryPolicy) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(CommentaryError::Config("API key is empty".to_string()));
        }

        Ok(Self {
            http: create_http_client(Duration::from_secs(settings.timeout_seconds))?,
            endpoint: format!("{}/chat/completions", settings.api_base.trim_end_matches('/')),
            api_key,
            retry,
        })
    }

    /// Send a single request without retrying.
    async fn send(&self, request: &CreateChatCompletionRequest) -> Result<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommentaryError::Service {
                status: Some(status.as_u16()),
                message,
            });
        }

        let completion: CreateChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CommentaryError::Service {
                status: None,
                message: "Empty response from LLM".to_string(),
            })
    }
}

/// Build the wire request for a rendered completion request.
pub(crate) fn build_chat_request(request: &CompletionRequest) -> Result<CreateChatCompletionRequest> {
    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system.clone())
            .build()
            .map_err(|e| CommentaryError::InvalidInput(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(request.user.clone())
            .build()
            .map_err(|e| CommentaryError::InvalidInput(e.to_string()))?
            .into(),
    ];

    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(&request.model).messages(messages);
    if let Some(temperature) = request.temperature {
        args.temperature(temperature);
    }

    args.build()
        .map_err(|e| CommentaryError::InvalidInput(e.to_string()))
}

#[async_trait]
impl CompletionService for OpenAICompletion {
    #[instrument(skip(self, request), fields(stage = %request.stage, model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_chat_request(request)?;
        let body = &body;

        let text = retry_with_backoff(&self.retry, request.stage.name(), || self.send(body)).await?;

        debug!("Completion returned {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StageKind;

    fn request(temperature: Option<f32>) -> CompletionRequest {
        CompletionRequest {
            stage: StageKind::Filter,
            model: "gpt-4o-mini".to_string(),
            system: "system text".to_string(),
            user: "user text".to_string(),
            temperature,
        }
    }

    #[test]
    fn test_build_chat_request() {
        let body = build_chat_request(&request(Some(0.0))).unwrap();
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.temperature, Some(0.0));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "user text");
    }

    #[test]
    fn test_temperature_omitted_when_unset() {
        let body = build_chat_request(&request(None)).unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAICompletion::new(&LlmSettings::default(), "  ".to_string(), RetryPolicy::none());
        assert!(matches!(result, Err(CommentaryError::Config(_))));
    }
}
