//! Vector store abstraction for Syllabus.
//!
//! Provides a trait-based interface over the two indexes the assistant
//! needs: a course catalog (one entry per course, embedded by title) and a
//! chunk index holding the searchable course text.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A lesson within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson number, unique within its course.
    pub lesson_number: u32,
    pub title: String,
    #[serde(default)]
    pub lesson_link: Option<String>,
}

/// A course in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course title. Case-sensitive unique identifier.
    pub title: String,
    #[serde(default)]
    pub course_link: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Look up a lesson by number.
    pub fn lesson(&self, lesson_number: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.lesson_number == lesson_number)
    }
}

/// A unit of searchable course text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    /// Title of the owning course.
    pub course_title: String,
    /// Owning lesson, or `None` for course-level content.
    #[serde(default)]
    pub lesson_number: Option<u32>,
    /// Position of this chunk within its course.
    pub chunk_index: u32,
}

/// A chunk paired with its embedding, ready for storage.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: CourseChunk,
    pub embedding: Vec<f32>,
}

/// A chunk returned from a similarity query.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub chunk: CourseChunk,
    /// Cosine distance to the query (lower is closer).
    pub distance: f32,
}

/// A catalog entry returned from a course-title lookup.
#[derive(Debug, Clone)]
pub struct CourseMatch {
    pub title: String,
    pub distance: f32,
}

/// Metadata filter applied to chunk searches.
///
/// Both fields set means the conjunction of the two conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkFilter {
    pub course_title: Option<String>,
    pub lesson_number: Option<u32>,
}

impl ChunkFilter {
    pub fn new(course_title: Option<String>, lesson_number: Option<u32>) -> Self {
        Self {
            course_title,
            lesson_number,
        }
    }

    /// True when no condition is set.
    pub fn is_empty(&self) -> bool {
        self.course_title.is_none() && self.lesson_number.is_none()
    }

    /// Check whether a chunk satisfies every condition of this filter.
    pub fn matches(&self, chunk: &CourseChunk) -> bool {
        let course_ok = self
            .course_title
            .as_ref()
            .map_or(true, |title| &chunk.course_title == title);
        let lesson_ok = self
            .lesson_number
            .map_or(true, |n| chunk.lesson_number == Some(n));
        course_ok && lesson_ok
    }
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add a course and its chunks as one unit. Returns `false`, storing
    /// nothing, if the title already exists.
    async fn add_course(
        &self,
        course: &Course,
        title_embedding: &[f32],
        chunks: &[EmbeddedChunk],
    ) -> Result<bool>;

    /// Find the chunks nearest to the query, nearest first.
    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        filter: &ChunkFilter,
        limit: usize,
    ) -> Result<Vec<ChunkMatch>>;

    /// Find the catalog entry whose title is nearest to the query.
    async fn nearest_course(&self, query_embedding: &[f32]) -> Result<Option<CourseMatch>>;

    /// Get a course by its exact title.
    async fn get_course(&self, title: &str) -> Result<Option<Course>>;

    /// List all course titles, sorted.
    async fn course_titles(&self) -> Result<Vec<String>>;

    /// Number of chunks in the content index.
    async fn chunk_count(&self) -> Result<usize>;

    /// Remove every course and chunk.
    async fn clear(&self) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance in `[0, 2]`; 0 for identical directions.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Sort matches nearest first and keep at most `limit`.
pub(crate) fn rank_matches(mut matches: Vec<ChunkMatch>, limit: usize) -> Vec<ChunkMatch> {
    matches.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
    });
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(course: &str, lesson: Option<u32>) -> CourseChunk {
        CourseChunk {
            content: "text".to_string(),
            course_title: course.to_string(),
            lesson_number: lesson,
            chunk_index: 0,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_distance(&a, &d) - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_filter_conjunction() {
        let filter = ChunkFilter::new(Some("Rust".to_string()), Some(2));
        assert!(filter.matches(&chunk("Rust", Some(2))));
        assert!(!filter.matches(&chunk("Rust", Some(1))));
        assert!(!filter.matches(&chunk("Go", Some(2))));
        assert!(!filter.matches(&chunk("Rust", None)));
    }

    #[test]
    fn test_filter_single_conditions() {
        let by_lesson = ChunkFilter::new(None, Some(3));
        assert!(by_lesson.matches(&chunk("Any", Some(3))));
        assert!(!by_lesson.matches(&chunk("Any", None)));

        let none = ChunkFilter::default();
        assert!(none.is_empty());
        assert!(none.matches(&chunk("Any", None)));
    }

    #[test]
    fn test_rank_matches_nearest_first() {
        let matches = vec![
            ChunkMatch { chunk: chunk("A", None), distance: 0.7 },
            ChunkMatch { chunk: chunk("B", None), distance: 0.1 },
            ChunkMatch { chunk: chunk("C", None), distance: 0.4 },
        ];
        let ranked = rank_matches(matches, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.course_title, "B");
        assert_eq!(ranked[1].chunk.course_title, "C");
    }
}
