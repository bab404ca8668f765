//! Batch command implementation.

use crate::agents::{FilterDecision, Route};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::coordinator::Coordinator;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::Path;

/// Result of one comment in a batch.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub index: usize,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the batch command.
pub async fn run_batch(
    file: &str,
    output: Option<String>,
    concurrency: Option<usize>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Respond, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }
    for missing in preflight::missing_resources(&settings) {
        Output::warning(&missing);
    }

    let comments = read_comments(Path::new(file))?;
    if comments.is_empty() {
        Output::warning("No comments in input file.");
        return Ok(());
    }

    let coordinator = Coordinator::new(&settings)?;
    let concurrency = concurrency.unwrap_or(settings.pipeline.max_concurrent_comments);

    Output::info(&format!(
        "Processing {} comments ({} at a time)",
        comments.len(),
        concurrency.max(1)
    ));
    let pb = Output::progress_bar(comments.len() as u64, "comments");
    let entries = process_all(&coordinator, comments, concurrency, &pb).await;
    pb.finish_and_clear();

    let failed = entries.iter().filter(|e| e.error.is_some()).count();

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&entries)?;
            std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path))?;
            Output::success(&format!("Wrote {} results to {}", entries.len(), path));
        }
        None => {
            for entry in &entries {
                match (&entry.response, &entry.error) {
                    (Some(response), _) => {
                        let decision = match (entry.filter, entry.route) {
                            (_, Some(route)) => route.to_string(),
                            (Some(filter), None) => filter.to_string(),
                            (None, None) => String::new(),
                        };
                        Output::reply(&entry.comment, &decision, response);
                    }
                    (None, Some(error)) => Output::reply(&entry.comment, "error", error),
                    (None, None) => {}
                }
            }
        }
    }

    if failed > 0 {
        Output::warning(&format!("{} of {} comments failed", failed, entries.len()));
    }

    Ok(())
}

/// Parse a JSON array of comment strings.
fn read_comments(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let comments: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of strings", path.display()))?;
    Ok(comments)
}

/// Run every comment through the pipeline, at most `concurrency` at a time.
///
/// Runs are independent: one failing comment is recorded and the rest carry on.
/// Entries come back in input order.
pub async fn process_all(
    coordinator: &Coordinator,
    comments: Vec<String>,
    concurrency: usize,
    progress: &ProgressBar,
) -> Vec<BatchEntry> {
    let mut entries: Vec<BatchEntry> = stream::iter(comments.into_iter().enumerate())
        .map(|(index, comment)| async move {
            let result = coordinator.process(&comment).await;
            progress.inc(1);
            match result {
                Ok(outcome) => BatchEntry {
                    index,
                    comment,
                    filter: Some(outcome.filter),
                    route: outcome.route,
                    response: Some(outcome.response.into_string()),
                    error: None,
                },
                Err(e) => BatchEntry {
                    index,
                    comment,
                    filter: None,
                    route: None,
                    response: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    entries.sort_by_key(|e| e.index);
    entries
}
