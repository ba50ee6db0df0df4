//! Shared fakes for unit tests.

use crate::agent::{CompletionProvider, CompletionRequest, CompletionResponse, ToolInvocation};
use crate::embedding::Embedder;
use crate::error::{Result, SyllabusError};
use crate::rag::CourseStore;
use crate::vector_store::{Course, CourseChunk, Lesson, MemoryVectorStore};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// A provider that replays scripted responses and records every request.
///
/// Once the script is exhausted, further calls fail with a provider error.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers once with `text`.
    pub fn answering(text: &str) -> Self {
        Self::new(vec![CompletionResponse::answer(text)])
    }

    /// A provider that requests the same tool on every call.
    pub fn always_requesting(name: &str, arguments: serde_json::Value, calls: usize) -> Self {
        Self::new(
            (0..calls)
                .map(|i| tool_request(&format!("call_{}", i), name, arguments.clone()))
                .collect(),
        )
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SyllabusError::Provider("script exhausted".to_string()))
    }
}

/// Build a single-invocation tool request.
pub fn tool_request(id: &str, name: &str, arguments: serde_json::Value) -> CompletionResponse {
    CompletionResponse::ToolRequest {
        text: None,
        calls: vec![ToolInvocation {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
    }
}

/// Deterministic bag-of-words embedder.
///
/// Each distinct word gets its own dimension the first time it is seen, so
/// texts sharing words land close together and unrelated texts are
/// orthogonal.
pub struct KeywordEmbedder {
    vocabulary: Mutex<HashMap<String, usize>>,
}

impl KeywordEmbedder {
    const DIMENSIONS: usize = 512;

    pub fn new() -> Self {
        Self {
            vocabulary: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vocabulary = self.vocabulary.lock().unwrap();
        let mut vector = vec![0.0; Self::DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            let next = vocabulary.len();
            let slot = *vocabulary.entry(word.to_lowercase()).or_insert(next);
            vector[slot % Self::DIMENSIONS] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }
}

/// An embedder whose every call fails, standing in for an unreachable index.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(SyllabusError::Embedding("connection failed".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(SyllabusError::Embedding("connection failed".to_string()))
    }

    fn dimensions(&self) -> usize {
        0
    }
}

/// Embeds single texts but fails every batch, as a flaky API would midway
/// through an import.
pub struct BatchFailingEmbedder;

#[async_trait]
impl Embedder for BatchFailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0])
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(SyllabusError::Embedding("transient".to_string()))
    }

    fn dimensions(&self) -> usize {
        1
    }
}

pub fn intro_to_python() -> Course {
    Course {
        title: "Intro to Python".to_string(),
        course_link: Some("https://example.com/python".to_string()),
        instructor: Some("Ada Lovelace".to_string()),
        lessons: vec![
            Lesson {
                lesson_number: 1,
                title: "Variables".to_string(),
                lesson_link: Some("https://example.com/python/1".to_string()),
            },
            Lesson {
                lesson_number: 2,
                title: "Functions".to_string(),
                lesson_link: Some("https://example.com/python/2".to_string()),
            },
        ],
    }
}

pub fn rust_fundamentals() -> Course {
    Course {
        title: "Rust Fundamentals".to_string(),
        course_link: Some("https://example.com/rust".to_string()),
        instructor: None,
        lessons: vec![Lesson {
            lesson_number: 1,
            title: "Ownership".to_string(),
            lesson_link: Some("https://example.com/rust/1".to_string()),
        }],
    }
}

pub fn chunk(course: &str, lesson: Option<u32>, index: u32, content: &str) -> CourseChunk {
    CourseChunk {
        content: content.to_string(),
        course_title: course.to_string(),
        lesson_number: lesson,
        chunk_index: index,
    }
}

/// An in-memory course store seeded with two small courses.
pub async fn seeded_store(max_results: usize) -> Arc<CourseStore> {
    let store = CourseStore::new(
        Arc::new(MemoryVectorStore::new()),
        Arc::new(KeywordEmbedder::new()),
        max_results,
    )
    .unwrap();

    store
        .import_course(
            &intro_to_python(),
            &[
                chunk("Intro to Python", Some(1), 0, "Variables store data"),
                chunk("Intro to Python", Some(2), 1, "Functions group reusable statements"),
            ],
        )
        .await
        .unwrap();
    store
        .import_course(
            &rust_fundamentals(),
            &[chunk("Rust Fundamentals", Some(1), 0, "Ownership moves values between variables")],
        )
        .await
        .unwrap();

    Arc::new(store)
}

/// An in-memory course store with no courses.
pub fn empty_store() -> Arc<CourseStore> {
    Arc::new(
        CourseStore::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder::new()),
            5,
        )
        .unwrap(),
    )
}
