//! Pre-chunked course catalogs loaded from JSON.
//!
//! ```json
//! {
//!   "courses": [
//!     {
//!       "title": "Intro to Python",
//!       "course_link": "https://example.com/python",
//!       "lessons": [{ "lesson_number": 1, "title": "Variables" }],
//!       "chunks": [{ "lesson_number": 1, "content": "Variables store data." }]
//!     }
//!   ]
//! }
//! ```

use super::{CourseStore, ImportOutcome};
use crate::error::{Result, SyllabusError};
use crate::vector_store::{Course, CourseChunk};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Text of one chunk; the owning course is implied by nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogChunk {
    pub content: String,
    #[serde(default)]
    pub lesson_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCourse {
    #[serde(flatten)]
    pub course: Course,
    #[serde(default)]
    pub chunks: Vec<CatalogChunk>,
}

impl CatalogCourse {
    /// Chunks numbered in catalog order.
    pub fn course_chunks(&self) -> Vec<CourseChunk> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(i, c)| CourseChunk {
                content: c.content.clone(),
                course_title: self.course.title.clone(),
                lesson_number: c.lesson_number,
                chunk_index: i as u32,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub courses: Vec<CatalogCourse>,
}

/// Totals across one catalog import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub chunks: usize,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject chunks that point at lessons their course does not have.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.courses {
            for chunk in &entry.chunks {
                if let Some(n) = chunk.lesson_number {
                    if entry.course.lesson(n).is_none() {
                        return Err(SyllabusError::InvalidInput(format!(
                            "Course '{}' has no lesson {}",
                            entry.course.title, n
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Import every course, skipping titles already in the store.
    pub async fn import_into(&self, store: &CourseStore) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for entry in &self.courses {
            let ImportOutcome { added, chunks } =
                store.import_course(&entry.course, &entry.course_chunks()).await?;
            if added {
                summary.added += 1;
                summary.chunks += chunks;
            } else {
                summary.skipped += 1;
            }
        }

        info!(
            "Imported {} courses ({} chunks), skipped {}",
            summary.added, summary.chunks, summary.skipped
        );
        Ok(summary)
    }
}
