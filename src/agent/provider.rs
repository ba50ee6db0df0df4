//! Completion provider contract.
//!
//! The agent loop talks to the language model only through
//! [`CompletionProvider`], so the wire format of any concrete backend stays
//! out of the loop logic.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Schema advertised to the model for one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool's arguments.
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Provider-assigned id used to correlate the result.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// The result of one invocation, fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub invocation_id: String,
    pub content: String,
}

/// A conversation turn sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
    },
    /// A model turn that requested tools, replayed verbatim.
    Assistant {
        text: Option<String>,
        tool_calls: Vec<ToolInvocation>,
    },
    /// All results of one round, in request order.
    ToolResults {
        results: Vec<ToolResult>,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

/// A single call to the completion provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    /// `None` withholds tools and forces a plain-text answer.
    pub tools: Option<Vec<ToolDefinition>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// What the provider returned.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResponse {
    /// A final plain-text answer.
    Answer(String),
    /// The model wants tools executed before it answers.
    ToolRequest {
        text: Option<String>,
        calls: Vec<ToolInvocation>,
    },
}

impl CompletionResponse {
    pub fn answer(text: impl Into<String>) -> Self {
        CompletionResponse::Answer(text.into())
    }
}

/// Trait for language-model completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run one completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}
