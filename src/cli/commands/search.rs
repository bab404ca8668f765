//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::TranscriptSearch;
use anyhow::Result;

/// Run the search command.
pub fn run_search(query: &str, json: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let search = TranscriptSearch::open(&settings.transcripts_path());

    match search.search(query) {
        Ok(results) if json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Ok(results) => {
            if results.is_empty() {
                Output::warning(&results.message);
            } else {
                Output::success(&results.message);
                for (i, excerpt) in results.matches.iter().enumerate() {
                    Output::transcript_match(i + 1, excerpt);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
