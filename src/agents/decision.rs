//! Enumerated stage decisions and strict label parsing.

use crate::error::{CommentaryError, Result};
use crate::llm::StageKind;
use serde::Serialize;

/// Outcome of the filter stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDecision {
    Accept,
    Ignore,
}

/// Outcome of the router stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Question,
    Praise,
}

impl FilterDecision {
    /// Parse the filter stage's reply. Anything but ACCEPT or IGNORE is an error.
    pub fn parse(output: &str) -> Result<Self> {
        match normalize_label(output).as_str() {
            "accept" => Ok(FilterDecision::Accept),
            "ignore" => Ok(FilterDecision::Ignore),
            _ => Err(malformed(StageKind::Filter, output)),
        }
    }
}

impl Route {
    /// Parse the router stage's reply. Anything but Question or Praise is an error.
    pub fn parse(output: &str) -> Result<Self> {
        match normalize_label(output).as_str() {
            "question" => Ok(Route::Question),
            "praise" => Ok(Route::Praise),
            _ => Err(malformed(StageKind::Router, output)),
        }
    }
}

impl std::fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterDecision::Accept => write!(f, "accept"),
            FilterDecision::Ignore => write!(f, "ignore"),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Question => write!(f, "question"),
            Route::Praise => write!(f, "praise"),
        }
    }
}

/// Strip whitespace, quotes and markdown emphasis around a one-word label.
fn normalize_label(output: &str) -> String {
    output
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '*' | '.' | '!'))
        .to_lowercase()
}

fn malformed(stage: StageKind, output: &str) -> CommentaryError {
    CommentaryError::MalformedOutput {
        stage: stage.name().to_string(),
        output: output.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_labels() {
        assert_eq!(FilterDecision::parse("ACCEPT").unwrap(), FilterDecision::Accept);
        assert_eq!(FilterDecision::parse("  ignore.\n").unwrap(), FilterDecision::Ignore);
        assert_eq!(FilterDecision::parse("**ACCEPT**").unwrap(), FilterDecision::Accept);
        assert_eq!(FilterDecision::parse("\"Ignore\"").unwrap(), FilterDecision::Ignore);
    }

    #[test]
    fn test_parse_route_labels() {
        assert_eq!(Route::parse("Question").unwrap(), Route::Question);
        assert_eq!(Route::parse("`praise`").unwrap(), Route::Praise);
    }

    #[test]
    fn test_out_of_taxonomy_label_is_an_error() {
        for output in ["", "MAYBE", "I think ACCEPT", "Question or Praise", "ACCEPT IGNORE"] {
            let err = FilterDecision::parse(output).unwrap_err();
            assert!(
                matches!(err, CommentaryError::MalformedOutput { ref stage, .. } if stage == "filter"),
                "output {:?}",
                output
            );
        }

        let err = Route::parse("Neither").unwrap_err();
        assert!(matches!(err, CommentaryError::MalformedOutput { ref stage, .. } if stage == "router"));
    }

    #[test]
    fn test_labels_from_other_stage_rejected() {
        assert!(FilterDecision::parse("Question").is_err());
        assert!(Route::parse("ACCEPT").is_err());
    }
}
