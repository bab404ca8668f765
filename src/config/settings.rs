//! Configuration settings for Commentary.

use crate::error::{CommentaryError, Result};
use crate::llm::StageKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub retry: RetrySettings,
    pub search: SearchSettings,
    pub data: DataSettings,
    pub pipeline: PipelineSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Settings for the external completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Default chat model for every stage.
    pub model: String,
    /// Per-stage model overrides, keyed by stage name (filter, router, praise, synthesis, question).
    pub stage_models: HashMap<String, String>,
    /// Timeout for a single HTTP request, in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            stage_models: HashMap::new(),
            timeout_seconds: 300,
        }
    }
}

/// Retry policy for transient completion service failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of attempts per call, including the first.
    pub attempts: u32,
    /// Multiplier applied to the delay after each failed attempt.
    pub exp_base: f64,
    /// Delay before the first retry, in seconds.
    pub initial_delay_seconds: f64,
    /// Upper bound for any single delay, in seconds.
    pub max_delay_seconds: f64,
    /// HTTP status codes that are worth retrying.
    pub http_status_codes: Vec<u16>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 5,
            exp_base: 7.0,
            initial_delay_seconds: 1.0,
            max_delay_seconds: 60.0,
            http_status_codes: vec![429, 500, 503, 504],
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Whether questions are researched on the web at all.
    pub enabled: bool,
    /// Search-capable chat model.
    pub model: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini-search-preview".to_string(),
        }
    }
}

/// Locations of the static data the pipeline reads at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Transcript corpus (plain text, paragraphs separated by blank lines).
    pub transcripts_path: String,
    /// Style exemplars (JSON array of input_comment/your_response pairs).
    pub exemplars_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            transcripts_path: "~/.commentary/transcripts.txt".to_string(),
            exemplars_path: "~/.commentary/gold_standard.json".to_string(),
        }
    }
}

/// Pipeline behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// End-to-end deadline for a single comment, in seconds. 0 disables it.
    pub deadline_seconds: u64,
    /// Reply used when the filter decides a comment needs no response.
    pub ignore_message: String,
    /// Reply used when the gathered information cannot answer a question.
    pub fallback_message: String,
    /// How many comments a batch run processes at once.
    pub max_concurrent_comments: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            deadline_seconds: 120,
            ignore_message: "This comment doesn't need a response.".to_string(),
            fallback_message: "I don't have enough info on this one from the videos yet. \
                               Could you clarify what exactly you're looking for?"
                .to_string(),
            max_concurrent_comments: 4,
        }
    }
}

impl PipelineSettings {
    /// The deadline as a duration, if one is configured.
    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_seconds > 0).then(|| Duration::from_secs(self.deadline_seconds))
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("commentary")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded transcript corpus path.
    pub fn transcripts_path(&self) -> PathBuf {
        Self::expand_path(&self.data.transcripts_path)
    }

    /// Get the expanded style exemplars path.
    pub fn exemplars_path(&self) -> PathBuf {
        Self::expand_path(&self.data.exemplars_path)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        let var = &self.llm.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(CommentaryError::Config(format!(
                "{} is empty. Set it with: export {}='sk-...'",
                var, var
            ))),
            Err(_) => Err(CommentaryError::Config(format!(
                "{} not set. Set it with: export {}='sk-...'",
                var, var
            ))),
        }
    }

    /// Model used by a given stage.
    pub fn model_for(&self, stage: StageKind) -> String {
        if stage == StageKind::WebSearch {
            return self.search.model.clone();
        }
        self.llm
            .stage_models
            .get(stage.name())
            .cloned()
            .unwrap_or_else(|| self.llm.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_retry_contract() {
        let settings = Settings::default();
        assert_eq!(settings.retry.attempts, 5);
        assert_eq!(settings.retry.http_status_codes, vec![429, 500, 503, 504]);
        assert_eq!(settings.pipeline.deadline(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            model = "gpt-4.1-mini"

            [llm.stage_models]
            synthesis = "gpt-4.1"

            [pipeline]
            deadline_seconds = 0
            "#,
        )
        .unwrap();

        assert_eq!(settings.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.model_for(StageKind::Filter), "gpt-4.1-mini");
        assert_eq!(settings.model_for(StageKind::Synthesis), "gpt-4.1");
        assert_eq!(settings.model_for(StageKind::WebSearch), "gpt-4o-mini-search-preview");
        assert_eq!(settings.pipeline.deadline(), None);
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "COMMENTARY_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = settings.api_key().unwrap_err();
        assert!(matches!(err, CommentaryError::Config(_)));
    }
}
