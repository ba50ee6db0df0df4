//! Configuration module for Syllabus.
//!
//! Handles loading and validating application settings.

mod settings;

pub use settings::{
    CompletionSettings, EmbeddingSettings, GeneralSettings, ServerSettings, SessionSettings,
    Settings, VectorStoreProvider, VectorStoreSettings,
};
