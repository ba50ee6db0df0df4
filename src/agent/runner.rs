//! Agent runner with a bounded tool calling loop.

use super::provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, Message, ToolInvocation, ToolResult,
};
use super::registry::ToolRegistry;
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Maximum number of tool rounds per query. Once reached, tools are
/// withheld and the model must answer in plain text.
pub const MAX_TOOL_ROUNDS: usize = 2;

/// Answer returned when the model never produced usable text.
pub const FAILURE_ANSWER: &str = "I wasn't able to complete an answer to that question.";

/// Default system prompt for course questions.
pub const SYSTEM_PROMPT: &str = r#"You are an assistant specialized in course materials and educational content, with tools for searching course content and reading course outlines.

Tool usage:
- Use 'search_course_content' only for questions about specific course content or detailed educational materials
- You may search up to two times in sequence when the first result is insufficient or a follow-up lookup is needed. Use this sparingly.
- Use 'get_course_outline' for outline or syllabus questions. Return the course title, course link and the complete lesson list with every lesson number and title.
- After all searches are complete, synthesize the results into one accurate, fact-based response
- If searches yield no results, say so clearly without offering alternatives

Response protocol:
- General knowledge questions: answer from existing knowledge without searching
- Course-specific questions: search first, then answer
- Give direct answers only. Do not explain your reasoning or your searches, and do not mention "the search results".

Keep every response brief, educational and clear, with examples where they aid understanding.
Provide only the direct answer to what was asked."#;

/// Agent that answers one query, consulting tools for at most
/// [`MAX_TOOL_ROUNDS`] rounds.
pub struct Agent {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl Agent {
    /// Create a new agent over the given completion provider.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            system_prompt: SYSTEM_PROMPT.to_string(),
            temperature: 0.0,
            max_tokens: 800,
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Answer `query`, folding `history` into the system instruction.
    ///
    /// Provider errors propagate. Tool errors never do: they are reported
    /// back to the model as the tool's result.
    #[instrument(skip(self, history, tools), fields(provider = %self.provider.name()))]
    pub async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&mut ToolRegistry>,
    ) -> Result<AgentResponse> {
        let system = match history {
            Some(h) if !h.is_empty() => format!("{}\n\nPrevious conversation:\n{}", self.system_prompt, h),
            _ => self.system_prompt.clone(),
        };

        let mut registry = tools.filter(|r| !r.is_empty());
        let mut messages = vec![Message::user(query)];
        let mut records = Vec::new();
        let mut rounds = 0;
        let mut provider_calls = 0;
        let mut state = LoopState::AwaitingModel;

        let content = loop {
            state = match state {
                LoopState::AwaitingModel => {
                    let offered = match registry.as_deref() {
                        Some(r) if rounds < MAX_TOOL_ROUNDS => Some(r.definitions()),
                        _ => None,
                    };
                    let tools_offered = offered.is_some();

                    let request = CompletionRequest {
                        system: system.clone(),
                        messages: messages.clone(),
                        tools: offered,
                        temperature: self.temperature,
                        max_tokens: self.max_tokens,
                    };

                    provider_calls += 1;
                    debug!("Provider call {} (round {})", provider_calls, rounds);

                    match self.provider.complete(&request).await? {
                        CompletionResponse::Answer(text) => LoopState::Done(text),
                        CompletionResponse::ToolRequest { text, calls } if calls.is_empty() => {
                            LoopState::Done(text.unwrap_or_else(|| FAILURE_ANSWER.to_string()))
                        }
                        CompletionResponse::ToolRequest { text, .. } if registry.is_none() => {
                            LoopState::Done(text.unwrap_or_else(|| FAILURE_ANSWER.to_string()))
                        }
                        CompletionResponse::ToolRequest { .. } if !tools_offered => {
                            warn!("Model requested tools after {} rounds with tools withheld", rounds);
                            LoopState::Done(FAILURE_ANSWER.to_string())
                        }
                        CompletionResponse::ToolRequest { text, calls } => {
                            LoopState::ExecutingTools { text, calls }
                        }
                    }
                }
                LoopState::ExecutingTools { text, calls } => {
                    // Unreachable without a registry; guarded above.
                    let Some(registry) = registry.as_deref_mut() else {
                        break FAILURE_ANSWER.to_string();
                    };

                    messages.push(Message::Assistant {
                        text,
                        tool_calls: calls.clone(),
                    });

                    let mut results = Vec::with_capacity(calls.len());
                    for invocation in &calls {
                        let content = execute(registry, invocation).await;
                        records.push(ToolCallRecord {
                            name: invocation.name.clone(),
                            arguments: invocation.arguments.to_string(),
                            result: content.clone(),
                        });
                        results.push(ToolResult {
                            invocation_id: invocation.id.clone(),
                            content,
                        });
                    }

                    messages.push(Message::ToolResults { results });
                    rounds += 1;
                    LoopState::AwaitingModel
                }
                LoopState::Done(text) => break text,
            };
        };

        info!(
            "Agent finished after {} provider calls and {} tool calls",
            provider_calls,
            records.len()
        );

        Ok(AgentResponse {
            content,
            tool_calls: records,
            provider_calls,
        })
    }
}

async fn execute(registry: &mut ToolRegistry, invocation: &ToolInvocation) -> String {
    info!("Agent calling tool: {} with args: {}", invocation.name, invocation.arguments);

    match registry.dispatch(invocation).await {
        Ok(output) => output,
        Err(e) => {
            warn!("Tool {} failed: {}", invocation.name, e);
            format!("Tool execution failed: {}", e)
        }
    }
}

enum LoopState {
    AwaitingModel,
    ExecutingTools {
        text: Option<String>,
        calls: Vec<ToolInvocation>,
    },
    Done(String),
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of completion requests sent.
    pub provider_calls: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
