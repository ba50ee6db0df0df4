//! Syllabus - Course Q&A with Retrieval
//!
//! A CLI and HTTP service answering questions about course materials.
//!
//! # Overview
//!
//! Syllabus lets you:
//! - Import pre-chunked courses into a local vector index
//! - Ask questions and get answers grounded in course content, with sources
//! - Keep short conversations going across questions with sessions
//! - Serve the same over a small JSON API
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `embedding` - Embedding generation
//! - `vector_store` - Course catalog and chunk index
//! - `agent` - Completion provider, tools and the bounded tool-calling loop
//! - `session` - Per-session conversation history
//! - `rag` - Course search and the query facade
//!
//! # Example
//!
//! ```rust,no_run
//! use syllabus::config::Settings;
//! use syllabus::rag::RagSystem;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let rag = RagSystem::from_settings(&settings)?;
//!
//!     let response = rag.query("What does lesson 1 cover?", None).await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod rag;
pub mod session;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{Result, SyllabusError};
