//! Respond command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::coordinator::Coordinator;
use anyhow::Result;

/// Run the respond command.
pub async fn run_respond(comment: &str, json: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Respond, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }
    for missing in preflight::missing_resources(&settings) {
        Output::warning(&missing);
    }

    let coordinator = Coordinator::new(&settings)?;

    let spinner = Output::spinner("Drafting reply...");
    let result = coordinator.process(comment).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) if json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Ok(outcome) => {
            println!("{}", outcome.response);
        }
        Err(e) => {
            Output::error(&format!("Failed to draft a reply: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
