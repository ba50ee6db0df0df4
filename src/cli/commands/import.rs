//! Import command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::{Catalog, RagSystem};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Import a pre-chunked course catalog.
pub async fn run_import(path: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Import) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let path = PathBuf::from(shellexpand::tilde(path).to_string());
    let catalog = Catalog::load(&path).with_context(|| format!("Failed to load catalog {:?}", path))?;

    let rag = RagSystem::from_settings(&settings)?;

    let spinner = Output::spinner(&format!("Embedding {} courses...", catalog.courses.len()));
    let result = catalog.import_into(rag.store()).await;
    spinner.finish_and_clear();

    let summary = result?;
    Output::success(&format!(
        "Imported {} courses ({} chunks)",
        summary.added, summary.chunks
    ));
    if summary.skipped > 0 {
        Output::warning(&format!("Skipped {} courses already indexed", summary.skipped));
    }

    Ok(())
}
