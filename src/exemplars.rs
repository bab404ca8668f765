//! Style exemplars: real (comment, reply) pairs the responders imitate.

use crate::error::{CommentaryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One example comment and the reply the creator wrote for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemplar {
    #[serde(rename = "input_comment", alias = "input")]
    pub input: String,
    #[serde(rename = "your_response", alias = "output")]
    pub output: String,
}

/// Ordered, read-only set of exemplars loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StyleExemplars {
    pairs: Vec<Exemplar>,
}

impl StyleExemplars {
    pub fn new(pairs: Vec<Exemplar>) -> Self {
        Self { pairs }
    }

    /// Load exemplars from a JSON array file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CommentaryError::ResourceNotFound(format!(
                "Style exemplars not found at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let pairs: Vec<Exemplar> = serde_json::from_str(&content)?;
        info!("Loaded {} style exemplars from {}", pairs.len(), path.display());
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[Exemplar] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render the exemplars as a prompt block.
    pub fn format_for_prompt(&self) -> String {
        self.pairs
            .iter()
            .map(|e| format!("Comment: {}\nReply: {}", e.input, e.output))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
