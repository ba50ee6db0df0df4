//! Tool definitions and implementations for the agent system.

use super::provider::ToolDefinition;
use crate::error::{Result, SyllabusError};
use crate::rag::{CourseStore, SearchResults};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// A user-facing reference back to the course material an answer drew on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Source {
    /// Label a source as `"<course> - Lesson <n>"`, or just the course title.
    pub fn label_for(course_title: &str, lesson_number: Option<u32>) -> String {
        match lesson_number {
            Some(n) => format!("{} - Lesson {}", course_title, n),
            None => course_title.to_string(),
        }
    }
}

/// Arguments of `search_course_content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub lesson_number: Option<u32>,
}

/// Arguments of `get_course_outline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineArgs {
    pub course_name: String,
}

/// Every tool the assistant knows, with typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    SearchCourseContent(SearchArgs),
    GetCourseOutline(OutlineArgs),
}

impl ToolCall {
    pub const SEARCH_COURSE_CONTENT: &'static str = "search_course_content";
    pub const GET_COURSE_OUTLINE: &'static str = "get_course_outline";

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::SearchCourseContent(_) => Self::SEARCH_COURSE_CONTENT,
            ToolCall::GetCourseOutline(_) => Self::GET_COURSE_OUTLINE,
        }
    }

    /// Parse a model-issued invocation into a typed call.
    pub fn parse(name: &str, arguments: &serde_json::Value) -> Result<Self> {
        match name {
            Self::SEARCH_COURSE_CONTENT => Ok(ToolCall::SearchCourseContent(parse_args(name, arguments)?)),
            Self::GET_COURSE_OUTLINE => Ok(ToolCall::GetCourseOutline(parse_args(name, arguments)?)),
            _ => Err(SyllabusError::UnknownTool(name.to_string())),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: &serde_json::Value) -> Result<T> {
    serde_json::from_value(arguments.clone()).map_err(|e| SyllabusError::ToolArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Text returned to the model plus the sources it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub sources: Vec<Source>,
}

/// A capability the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static schema advertised to the model.
    fn definition(&self) -> ToolDefinition;

    /// Execute a parsed call addressed to this tool.
    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput>;
}

fn wrong_call(expected: &str, call: &ToolCall) -> SyllabusError {
    SyllabusError::Tool(format!("{} cannot execute {}", expected, call.name()))
}

/// Semantic search over course content with optional course/lesson filters.
pub struct CourseSearchTool {
    store: Arc<CourseStore>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<CourseStore>) -> Self {
        Self { store }
    }

    /// Run a search and format the hits for the model.
    pub async fn search(&self, args: &SearchArgs) -> ToolOutput {
        let results = self
            .store
            .search(&args.query, args.course_name.as_deref(), args.lesson_number)
            .await;

        if let Some(error) = results.error {
            return ToolOutput {
                text: error,
                sources: Vec::new(),
            };
        }

        if results.is_empty() {
            return ToolOutput {
                text: no_results_message(args.course_name.as_deref(), args.lesson_number),
                sources: Vec::new(),
            };
        }

        self.format_results(results).await
    }

    async fn format_results(&self, results: SearchResults) -> ToolOutput {
        let mut blocks = Vec::with_capacity(results.hits.len());
        let mut sources = Vec::with_capacity(results.hits.len());

        for hit in results.hits {
            let label = Source::label_for(&hit.course_title, hit.lesson_number);
            blocks.push(format!("[{}]\n{}", label, hit.content));

            let link = match hit.lesson_number {
                Some(n) => self.store.lesson_link(&hit.course_title, n).await,
                None => self.store.course_link(&hit.course_title).await,
            };
            let link = link.unwrap_or_else(|e| {
                warn!("Failed to resolve link for '{}': {}", label, e);
                None
            });

            sources.push(Source { label, link });
        }

        ToolOutput {
            text: blocks.join("\n\n"),
            sources,
        }
    }
}

/// Build the no-results message, naming every active filter.
fn no_results_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut message = String::from("No relevant content found");
    if let Some(course) = course_name {
        message.push_str(&format!(" in course '{}'", course));
    }
    if let Some(lesson) = lesson_number {
        message.push_str(&format!(" in lesson {}", lesson));
    }
    message.push('.');
    message
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: ToolCall::SEARCH_COURSE_CONTENT.to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput> {
        match call {
            ToolCall::SearchCourseContent(args) => Ok(self.search(args).await),
            other => Err(wrong_call(ToolCall::SEARCH_COURSE_CONTENT, other)),
        }
    }
}

/// Returns a course's title, link, instructor and complete lesson list.
pub struct CourseOutlineTool {
    store: Arc<CourseStore>,
}

impl CourseOutlineTool {
    pub fn new(store: Arc<CourseStore>) -> Self {
        Self { store }
    }

    pub async fn outline(&self, args: &OutlineArgs) -> Result<ToolOutput> {
        let course = match self.store.find_course(&args.course_name).await {
            Ok(course) => course,
            Err(SyllabusError::CourseNotFound(_)) => {
                return Ok(ToolOutput {
                    text: format!("No course found matching '{}'", args.course_name),
                    sources: Vec::new(),
                })
            }
            Err(e) => return Err(e),
        };

        let mut lines = vec![format!("Course: {}", course.title)];
        if let Some(link) = &course.course_link {
            lines.push(format!("Link: {}", link));
        }
        if let Some(instructor) = &course.instructor {
            lines.push(format!("Instructor: {}", instructor));
        }
        lines.push(format!("Lessons ({}):", course.lessons.len()));
        for lesson in &course.lessons {
            lines.push(format!("Lesson {}: {}", lesson.lesson_number, lesson.title));
        }

        Ok(ToolOutput {
            text: lines.join("\n"),
            sources: vec![Source {
                label: course.title.clone(),
                link: course.course_link.clone(),
            }],
        })
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: ToolCall::GET_COURSE_OUTLINE.to_string(),
            description: "Get a course outline: title, course link and the complete list of lessons"
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work)"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput> {
        match call {
            ToolCall::GetCourseOutline(args) => self.outline(args).await,
            other => Err(wrong_call(ToolCall::GET_COURSE_OUTLINE, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{empty_store, seeded_store};

    #[test]
    fn test_parse_search_tool() {
        let call = ToolCall::parse(
            "search_course_content",
            &serde_json::json!({"query": "variables", "lesson_number": 2}),
        )
        .unwrap();
        assert_eq!(
            call,
            ToolCall::SearchCourseContent(SearchArgs {
                query: "variables".to_string(),
                course_name: None,
                lesson_number: Some(2),
            })
        );
        assert_eq!(call.name(), "search_course_content");
    }

    #[test]
    fn test_parse_unknown_and_malformed() {
        assert!(matches!(
            ToolCall::parse("delete_everything", &serde_json::json!({})),
            Err(SyllabusError::UnknownTool(name)) if name == "delete_everything"
        ));
        assert!(matches!(
            ToolCall::parse("get_course_outline", &serde_json::json!({"course": 3})),
            Err(SyllabusError::ToolArguments { .. })
        ));
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(Source::label_for("ML Course", Some(2)), "ML Course - Lesson 2");
        assert_eq!(Source::label_for("ML Course", None), "ML Course");
    }

    #[tokio::test]
    async fn test_no_results_echoes_filters() {
        let tool = CourseSearchTool::new(seeded_store(5).await);
        let output = tool
            .search(&SearchArgs {
                query: "anything".to_string(),
                course_name: Some("Rust".to_string()),
                lesson_number: Some(2),
            })
            .await;

        assert_eq!(
            output.text,
            "No relevant content found in course 'Rust' in lesson 2."
        );
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_no_results_without_filters() {
        let tool = CourseSearchTool::new(empty_store());
        let output = tool
            .search(&SearchArgs {
                query: "completely unknown topic".to_string(),
                course_name: None,
                lesson_number: None,
            })
            .await;

        assert_eq!(output.text, "No relevant content found.");
    }

    #[tokio::test]
    async fn test_store_error_passed_through() {
        let tool = CourseSearchTool::new(empty_store());
        let output = tool
            .search(&SearchArgs {
                query: "anything".to_string(),
                course_name: Some("Deep Learning".to_string()),
                lesson_number: None,
            })
            .await;

        assert_eq!(output.text, "No course found matching 'Deep Learning'");
    }

    #[tokio::test]
    async fn test_single_result_formatting_and_source() {
        let tool = CourseSearchTool::new(seeded_store(5).await);
        let output = tool
            .search(&SearchArgs {
                query: "Variables store data".to_string(),
                course_name: Some("Intro to Python".to_string()),
                lesson_number: Some(1),
            })
            .await;

        assert_eq!(output.text, "[Intro to Python - Lesson 1]\nVariables store data");
        assert_eq!(
            output.sources,
            vec![Source {
                label: "Intro to Python - Lesson 1".to_string(),
                link: Some("https://example.com/python/1".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_multiple_results_keep_order_and_sources() {
        let tool = CourseSearchTool::new(seeded_store(2).await);
        let output = tool
            .search(&SearchArgs {
                query: "variables".to_string(),
                course_name: None,
                lesson_number: None,
            })
            .await;

        let blocks: Vec<&str> = output.text.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(output.sources.len(), 2);
        for (block, source) in blocks.iter().zip(&output.sources) {
            assert!(block.starts_with(&format!("[{}]", source.label)));
        }
    }

    #[tokio::test]
    async fn test_outline_lists_every_lesson() {
        let tool = CourseOutlineTool::new(seeded_store(5).await);
        let output = tool
            .execute(&ToolCall::GetCourseOutline(OutlineArgs {
                course_name: "python".to_string(),
            }))
            .await
            .unwrap();

        assert!(output.text.starts_with("Course: Intro to Python"));
        assert!(output.text.contains("Link: https://example.com/python"));
        assert!(output.text.contains("Instructor: Ada Lovelace"));
        assert!(output.text.contains("Lesson 1: Variables"));
        assert!(output.text.contains("Lesson 2: Functions"));
        assert_eq!(output.sources.len(), 1);
        assert_eq!(output.sources[0].label, "Intro to Python");
    }

    #[tokio::test]
    async fn test_tool_rejects_foreign_call() {
        let tool = CourseOutlineTool::new(empty_store());
        let result = tool
            .execute(&ToolCall::SearchCourseContent(SearchArgs {
                query: "x".to_string(),
                course_name: None,
                lesson_number: None,
            }))
            .await;
        assert!(matches!(result, Err(SyllabusError::Tool(_))));
    }
}
