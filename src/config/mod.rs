//! Configuration module for Commentary.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, StagePrompt, NO_INFORMATION, NO_RELEVANT_RESULTS};
pub use settings::{
    DataSettings, GeneralSettings, LlmSettings, PipelineSettings, PromptSettings,
    RetrySettings, SearchSettings, Settings,
};
