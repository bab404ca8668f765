//! Keyword search over the channel's video transcripts.
//!
//! The corpus is a plain text file where paragraphs are separated by blank lines.
//! Search is a case-insensitive substring match on the query's words, in corpus order.

use crate::error::{CommentaryError, Result};
use crate::resource::Resource;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Maximum number of matches returned by a search.
pub const MAX_MATCHES: usize = 5;

/// Excerpts are cut to this many characters.
pub const EXCERPT_CHARS: usize = 500;

/// Query words this short or shorter are ignored.
const MAX_IGNORED_WORD_CHARS: usize = 2;

const ELLIPSIS: &str = "...";

/// Transcript text split into paragraphs.
#[derive(Debug, Clone)]
pub struct TranscriptCorpus {
    paragraphs: Vec<String>,
}

impl TranscriptCorpus {
    /// Build a corpus from raw text.
    pub fn from_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        let paragraphs = normalized.split("\n\n").map(str::to_string).collect();
        Self { paragraphs }
    }

    /// Load a corpus from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CommentaryError::ResourceNotFound(format!(
                "Transcripts file not found at {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            CommentaryError::ResourceNotFound(format!(
                "Could not read transcripts at {}: {}",
                path.display(),
                e
            ))
        })?;

        let corpus = Self::from_text(&text);
        info!("Loaded {} transcript paragraphs from {}", corpus.len(), path.display());
        Ok(corpus)
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Find paragraphs mentioning any word of the query.
    pub fn search(&self, query: &str) -> TranscriptMatches {
        let words = query_words(query);
        if words.is_empty() {
            return TranscriptMatches::new(Vec::new());
        }

        let matches = self
            .paragraphs
            .iter()
            .filter(|para| {
                let lower = para.to_lowercase();
                words.iter().any(|w| lower.contains(w.as_str()))
            })
            .take(MAX_MATCHES)
            .map(|para| excerpt(para))
            .collect();

        TranscriptMatches::new(matches)
    }
}

/// Lower-cased query words longer than the ignore threshold.
fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > MAX_IGNORED_WORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// First `EXCERPT_CHARS` characters of a paragraph, with an ellipsis if cut.
fn excerpt(paragraph: &str) -> String {
    let cut = match paragraph.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}{}", &paragraph[..idx], ELLIPSIS),
        None => paragraph.to_string(),
    };
    cut.trim().to_string()
}

/// Result of a successful transcript search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptMatches {
    pub matches: Vec<String>,
    pub count: usize,
    pub message: String,
}

impl TranscriptMatches {
    fn new(matches: Vec<String>) -> Self {
        let count = matches.len();
        let message = if count > 0 {
            format!("Found {} relevant section(s) in transcripts", count)
        } else {
            "No relevant information found in transcripts for this query".to_string()
        };
        Self {
            matches,
            count,
            message,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Format matches as numbered excerpts for a prompt.
    pub fn format_for_prompt(&self) -> String {
        self.matches
            .iter()
            .enumerate()
            .map(|(i, m)| format!("[{}] {}", i + 1, m))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Transcript lookup over a corpus loaded once at startup.
#[derive(Debug, Clone)]
pub struct TranscriptSearch {
    corpus: Resource<TranscriptCorpus>,
}

impl TranscriptSearch {
    /// Load the corpus at `path`. A missing file is remembered, not fatal.
    pub fn open(path: &Path) -> Self {
        let corpus = Resource::from_result(TranscriptCorpus::load(path));
        if let Resource::Unavailable(reason) = &corpus {
            warn!("Transcript search unavailable: {}", reason);
        }
        Self { corpus }
    }

    pub fn from_corpus(corpus: TranscriptCorpus) -> Self {
        Self {
            corpus: Resource::from(corpus),
        }
    }

    pub fn is_available(&self) -> bool {
        self.corpus.is_loaded()
    }

    /// Search the corpus. Fails only when the corpus could not be loaded.
    pub fn search(&self, query: &str) -> Result<TranscriptMatches> {
        let corpus = self.corpus.get()?;
        let result = corpus.search(query);
        debug!("Transcript search for {:?}: {}", query, result.message);
        Ok(result)
    }
}
