//! Pre-flight checks before running the pipeline.
//!
//! Validates configuration up front so a run does not fail halfway through
//! on something that was knowable before it started.

use crate::config::Settings;
use crate::error::{CommentaryError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Drafting replies needs the completion service credentials.
    Respond,
    /// Transcript lookup needs the corpus on disk.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Respond => {
            settings.api_key()?;
        }
        Operation::Search => {
            let transcripts = settings.transcripts_path();
            if !transcripts.exists() {
                return Err(CommentaryError::ResourceNotFound(format!(
                    "Transcripts file not found at {}",
                    transcripts.display()
                )));
            }
        }
    }
    Ok(())
}

/// Data files that are configured but not present.
///
/// These only fail the invocations that need them, so they are reported as warnings.
pub fn missing_resources(settings: &Settings) -> Vec<String> {
    let mut missing = Vec::new();
    let transcripts = settings.transcripts_path();
    if !transcripts.exists() {
        missing.push(format!("Transcripts file not found at {}", transcripts.display()));
    }
    let exemplars = settings.exemplars_path();
    if !exemplars.exists() {
        missing.push(format!("Style exemplars not found at {}", exemplars.display()));
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_search_needs_corpus_not_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.llm.api_key_env = "COMMENTARY_PREFLIGHT_UNSET_KEY".to_string();
        settings.data.transcripts_path = dir.path().join("t.txt").display().to_string();

        let err = check(Operation::Search, &settings).unwrap_err();
        assert!(matches!(err, CommentaryError::ResourceNotFound(_)));

        std::fs::write(dir.path().join("t.txt"), "GATE score talk").unwrap();
        assert!(check(Operation::Search, &settings).is_ok());
    }

    #[test]
    fn test_check_respond_needs_key() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "COMMENTARY_PREFLIGHT_UNSET_KEY".to_string();
        let err = check(Operation::Respond, &settings).unwrap_err();
        assert!(matches!(err, CommentaryError::Config(_)));
    }

    #[test]
    fn test_missing_resources_listed() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.data.transcripts_path = dir.path().join("t.txt").display().to_string();
        settings.data.exemplars_path = dir.path().join("g.json").display().to_string();

        assert_eq!(missing_resources(&settings).len(), 2);

        std::fs::write(dir.path().join("t.txt"), "hello").unwrap();
        let missing = missing_resources(&settings);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].starts_with("Style exemplars"));
    }
}
