//! Pre-flight checks before operations that call the OpenAI API.

use crate::error::{Result, SyllabusError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions needs completions and embeddings.
    Ask,
    /// Importing embeds every chunk.
    Import,
    /// Listing courses reads the local index only.
    Browse,
    /// The API server answers questions on every request.
    Serve,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    check_with_key(operation, std::env::var("OPENAI_API_KEY").ok())
}

fn check_with_key(operation: Operation, key: Option<String>) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Import | Operation::Serve => check_api_key(key),
        Operation::Browse => Ok(()),
    }
}

fn check_api_key(key: Option<String>) -> Result<()> {
    match key {
        Some(key) if !key.is_empty() => Ok(()),
        Some(_) => Err(SyllabusError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        None => Err(SyllabusError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
