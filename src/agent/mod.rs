//! Tool-calling agent for course questions.
//!
//! The [`Agent`] runs a bounded loop against a [`CompletionProvider`],
//! executing tools from a [`ToolRegistry`] between model calls.

mod openai;
mod provider;
mod registry;
mod runner;
mod tools;

pub use openai::OpenAIProvider;
pub use provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, Message, ToolDefinition,
    ToolInvocation, ToolResult,
};
pub use registry::ToolRegistry;
pub use runner::{Agent, AgentResponse, ToolCallRecord, FAILURE_ANSWER, MAX_TOOL_ROUNDS, SYSTEM_PROMPT};
pub use tools::{
    CourseOutlineTool, CourseSearchTool, OutlineArgs, SearchArgs, Source, Tool, ToolCall,
    ToolOutput,
};
