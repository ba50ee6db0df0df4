//! In-memory vector store implementation.
//!
//! Useful for testing and small catalogs.

use super::{
    cosine_distance, rank_matches, ChunkFilter, ChunkMatch, Course, CourseMatch, EmbeddedChunk,
    VectorStore,
};
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Indexes {
    courses: BTreeMap<String, (Course, Vec<f32>)>,
    chunks: Vec<EmbeddedChunk>,
}

/// In-memory vector store.
#[derive(Default)]
pub struct MemoryVectorStore {
    indexes: RwLock<Indexes>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Indexes>> {
        self.indexes
            .read()
            .map_err(|e| SyllabusError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Indexes>> {
        self.indexes
            .write()
            .map_err(|e| SyllabusError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add_course(
        &self,
        course: &Course,
        title_embedding: &[f32],
        chunks: &[EmbeddedChunk],
    ) -> Result<bool> {
        let mut indexes = self.write()?;
        if indexes.courses.contains_key(&course.title) {
            return Ok(false);
        }
        indexes
            .courses
            .insert(course.title.clone(), (course.clone(), title_embedding.to_vec()));
        indexes.chunks.extend_from_slice(chunks);
        Ok(true)
    }

    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        filter: &ChunkFilter,
        limit: usize,
    ) -> Result<Vec<ChunkMatch>> {
        let indexes = self.read()?;

        let matches = indexes
            .chunks
            .iter()
            .filter(|c| filter.matches(&c.chunk))
            .map(|c| ChunkMatch {
                chunk: c.chunk.clone(),
                distance: cosine_distance(query_embedding, &c.embedding),
            })
            .collect();

        Ok(rank_matches(matches, limit))
    }

    async fn nearest_course(&self, query_embedding: &[f32]) -> Result<Option<CourseMatch>> {
        let indexes = self.read()?;

        Ok(indexes
            .courses
            .iter()
            .map(|(title, (_, embedding))| CourseMatch {
                title: title.clone(),
                distance: cosine_distance(query_embedding, embedding),
            })
            .min_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }))
    }

    async fn get_course(&self, title: &str) -> Result<Option<Course>> {
        let indexes = self.read()?;
        Ok(indexes.courses.get(title).map(|(course, _)| course.clone()))
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        let indexes = self.read()?;
        Ok(indexes.courses.keys().cloned().collect())
    }

    async fn chunk_count(&self) -> Result<usize> {
        Ok(self.read()?.chunks.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut indexes = self.write()?;
        indexes.courses.clear();
        indexes.chunks.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{CourseChunk, Lesson};

    fn embedded(course: &str, lesson: Option<u32>, index: u32, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: CourseChunk {
                content: format!("{} chunk {}", course, index),
                course_title: course.to_string(),
                lesson_number: lesson,
                chunk_index: index,
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let course = Course {
            title: "Intro to Python".to_string(),
            course_link: None,
            instructor: None,
            lessons: vec![Lesson {
                lesson_number: 1,
                title: "Variables".to_string(),
                lesson_link: None,
            }],
        };

        let chunks = [
            embedded("Intro to Python", Some(1), 0, vec![1.0, 0.0, 0.0]),
            embedded("Intro to Python", Some(2), 1, vec![0.0, 1.0, 0.0]),
        ];
        assert!(store.add_course(&course, &[1.0, 0.0, 0.0], &chunks).await.unwrap());
        assert!(!store.add_course(&course, &[1.0, 0.0, 0.0], &chunks).await.unwrap());

        assert_eq!(store.chunk_count().await.unwrap(), 2);

        let results = store
            .search_chunks(&[1.0, 0.0, 0.0], &ChunkFilter::default(), 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].distance < results[1].distance);

        let filtered = store
            .search_chunks(&[1.0, 0.0, 0.0], &ChunkFilter::new(None, Some(2)), 10)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].chunk.lesson_number, Some(2));
    }

    #[tokio::test]
    async fn test_nearest_course() {
        let store = MemoryVectorStore::new();
        for (title, embedding) in [("Alpha", vec![1.0, 0.0]), ("Beta", vec![0.0, 1.0])] {
            let course = Course {
                title: title.to_string(),
                course_link: None,
                instructor: None,
                lessons: vec![],
            };
            store.add_course(&course, &embedding, &[]).await.unwrap();
        }

        let nearest = store.nearest_course(&[0.1, 0.9]).await.unwrap().unwrap();
        assert_eq!(nearest.title, "Beta");

        store.clear().await.unwrap();
        assert!(store.nearest_course(&[0.1, 0.9]).await.unwrap().is_none());
        assert!(store.course_titles().await.unwrap().is_empty());
    }
}
