//! OpenAI chat completions backend.

use super::provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, Message, ToolDefinition,
    ToolInvocation,
};
use crate::config::CompletionSettings;
use crate::error::{Result, SyllabusError};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionToolArgs, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

fn builder_error(e: impl std::fmt::Display) -> SyllabusError {
    SyllabusError::Provider(e.to_string())
}

/// Completion provider backed by the OpenAI chat completions API.
pub struct OpenAIProvider {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIProvider {
    pub fn new(model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeout)?,
            model: model.to_string(),
        })
    }

    /// Create a provider from the `[completion]` settings section.
    pub fn from_settings(settings: &CompletionSettings) -> Result<Self> {
        Self::new(&settings.model, Duration::from_secs(settings.timeout_secs))
    }

    fn build_messages(request: &CompletionRequest) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.clone())
                .build()
                .map_err(builder_error)?
                .into(),
        ];

        for message in &request.messages {
            match message {
                Message::User { content } => messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(content.clone())
                        .build()
                        .map_err(builder_error)?
                        .into(),
                ),
                Message::Assistant { text, tool_calls } => {
                    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                    if let Some(text) = text {
                        args.content(text.clone());
                    }
                    if !tool_calls.is_empty() {
                        args.tool_calls(tool_calls.iter().map(to_openai_call).collect::<Vec<_>>());
                    }
                    messages.push(args.build().map_err(builder_error)?.into());
                }
                Message::ToolResults { results } => {
                    for result in results {
                        messages.push(
                            ChatCompletionRequestToolMessageArgs::default()
                                .tool_call_id(result.invocation_id.clone())
                                .content(result.content.clone())
                                .build()
                                .map_err(builder_error)?
                                .into(),
                        );
                    }
                }
            }
        }

        Ok(messages)
    }
}

fn to_openai_call(invocation: &ToolInvocation) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: invocation.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: invocation.name.clone(),
            arguments: invocation.arguments.to_string(),
        },
    }
}

fn from_openai_call(call: ChatCompletionMessageToolCall) -> ToolInvocation {
    let arguments = serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
        warn!("Tool {} sent non-JSON arguments: {}", call.function.name, e);
        serde_json::Value::String(call.function.arguments.clone())
    });

    ToolInvocation {
        id: call.id,
        name: call.function.name,
        arguments,
    }
}

fn to_openai_tool(definition: &ToolDefinition) -> Result<ChatCompletionTool> {
    ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(
            FunctionObjectArgs::default()
                .name(definition.name.clone())
                .description(definition.description.clone())
                .parameters(definition.parameters.clone())
                .build()
                .map_err(builder_error)?,
        )
        .build()
        .map_err(builder_error)
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(Self::build_messages(request)?)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_tokens);

        if let Some(definitions) = &request.tools {
            let tools = definitions
                .iter()
                .map(to_openai_tool)
                .collect::<Result<Vec<_>>>()?;
            args.tools(tools).tool_choice(ChatCompletionToolChoiceOption::Auto);
        }

        let chat_request = args.build().map_err(builder_error)?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| SyllabusError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SyllabusError::OpenAI("No response from model".to_string()))?;

        let text = choice.message.content;
        let calls = choice.message.tool_calls.unwrap_or_default();
        debug!("Model returned {} tool calls", calls.len());

        if calls.is_empty() {
            return Ok(CompletionResponse::Answer(text.unwrap_or_default()));
        }

        Ok(CompletionResponse::ToolRequest {
            text,
            calls: calls.into_iter().map(from_openai_call).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolResult;

    #[test]
    fn test_tool_results_expand_to_one_message_each() {
        let request = CompletionRequest {
            system: "sys".to_string(),
            messages: vec![
                Message::user("q"),
                Message::Assistant {
                    text: None,
                    tool_calls: vec![ToolInvocation {
                        id: "call_1".to_string(),
                        name: "search_course_content".to_string(),
                        arguments: serde_json::json!({"query": "q"}),
                    }],
                },
                Message::ToolResults {
                    results: vec![
                        ToolResult {
                            invocation_id: "call_1".to_string(),
                            content: "a".to_string(),
                        },
                        ToolResult {
                            invocation_id: "call_2".to_string(),
                            content: "b".to_string(),
                        },
                    ],
                },
            ],
            tools: None,
            temperature: 0.0,
            max_tokens: 800,
        };

        let messages = OpenAIProvider::build_messages(&request).unwrap();
        assert_eq!(messages.len(), 5);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[4], ChatCompletionRequestMessage::Tool(_)));
    }

    #[test]
    fn test_malformed_arguments_are_kept_raw() {
        let invocation = from_openai_call(ChatCompletionMessageToolCall {
            id: "call_1".to_string(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: "search_course_content".to_string(),
                arguments: "{not json".to_string(),
            },
        });
        assert_eq!(invocation.arguments, serde_json::Value::String("{not json".to_string()));

        let roundtrip = from_openai_call(to_openai_call(&ToolInvocation {
            id: "call_2".to_string(),
            name: "get_course_outline".to_string(),
            arguments: serde_json::json!({"course_name": "Rust"}),
        }));
        assert_eq!(roundtrip.arguments["course_name"], "Rust");
    }
}
