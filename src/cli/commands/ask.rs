//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagSystem;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, model: Option<String>, mut settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.completion.model = model;
    }

    let rag = RagSystem::from_settings(&settings)?;

    let spinner = Output::spinner("Searching course materials...");

    match rag.query(question, None).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("\n{}", response.answer);
            Output::sources(&response.sources);
            println!();
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
