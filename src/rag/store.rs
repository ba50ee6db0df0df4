//! Course-aware semantic search over the vector store.

use crate::embedding::Embedder;
use crate::error::{Result, SyllabusError};
use crate::vector_store::{ChunkFilter, ChunkMatch, Course, CourseChunk, EmbeddedChunk, VectorStore};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One retrieved chunk with its metadata and distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub distance: f32,
}

impl From<ChunkMatch> for SearchHit {
    fn from(m: ChunkMatch) -> Self {
        Self {
            content: m.chunk.content,
            course_title: m.chunk.course_title,
            lesson_number: m.chunk.lesson_number,
            distance: m.distance,
        }
    }
}

/// Outcome of one semantic query: ranked hits, nothing, or an error message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    /// Hits ordered nearest first.
    pub hits: Vec<SearchHit>,
    /// Set when the lookup failed. `hits` is empty in that case.
    pub error: Option<String>,
}

impl SearchResults {
    pub fn from_matches(matches: Vec<ChunkMatch>) -> Self {
        Self {
            hits: matches.into_iter().map(SearchHit::from).collect(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Outcome of importing one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// False when the course title was already in the catalog.
    pub added: bool,
    pub chunks: usize,
}

/// Course catalog plus chunk index, queried through embeddings.
pub struct CourseStore {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_results: NonZeroUsize,
}

impl CourseStore {
    /// Create a store returning at most `max_results` chunks per search.
    ///
    /// A limit of zero is a configuration error: it would turn every search
    /// into an empty result indistinguishable from "no matches".
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        max_results: usize,
    ) -> Result<Self> {
        let max_results = NonZeroUsize::new(max_results).ok_or_else(|| {
            SyllabusError::Config("max_results must be at least 1".to_string())
        })?;

        Ok(Self {
            vector_store,
            embedder,
            max_results,
        })
    }

    /// Resolve a user-supplied course name to the closest catalog title.
    #[instrument(skip(self))]
    pub async fn resolve_course(&self, name: &str) -> Result<Option<String>> {
        let embedding = self.embedder.embed(name).await?;
        let nearest = self.vector_store.nearest_course(&embedding).await?;

        if let Some(m) = &nearest {
            debug!("Resolved '{}' to '{}' (distance {:.3})", name, m.title, m.distance);
        }
        Ok(nearest.map(|m| m.title))
    }

    /// Search course content with optional course and lesson filters.
    ///
    /// Never fails: lookup errors come back as [`SearchResults::failed`].
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        let course_title = match course_name {
            Some(name) => match self.resolve_course(name).await {
                Ok(Some(title)) => Some(title),
                Ok(None) => return SearchResults::failed(format!("No course found matching '{}'", name)),
                Err(e) => return SearchResults::failed(format!("Search error: {}", e)),
            },
            None => None,
        };

        let filter = ChunkFilter::new(course_title, lesson_number);

        let embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => return SearchResults::failed(format!("Search error: {}", e)),
        };

        match self
            .vector_store
            .search_chunks(&embedding, &filter, self.max_results.get())
            .await
        {
            Ok(matches) => SearchResults::from_matches(matches),
            Err(e) => {
                warn!("Chunk search failed: {}", e);
                SearchResults::failed(format!("Search error: {}", e))
            }
        }
    }

    /// Resolve a course name and load its catalog entry.
    pub async fn find_course(&self, name: &str) -> Result<Course> {
        let title = self
            .resolve_course(name)
            .await?
            .ok_or_else(|| SyllabusError::CourseNotFound(name.to_string()))?;
        self.get_course(&title)
            .await?
            .ok_or(SyllabusError::CourseNotFound(title))
    }

    /// Get a course by exact title.
    pub async fn get_course(&self, title: &str) -> Result<Option<Course>> {
        self.vector_store.get_course(title).await
    }

    /// Link of a lesson, if the course and lesson exist and carry one.
    pub async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Result<Option<String>> {
        Ok(self
            .vector_store
            .get_course(course_title)
            .await?
            .and_then(|c| c.lesson(lesson_number).and_then(|l| l.lesson_link.clone())))
    }

    /// Link of a course, if it exists and carries one.
    pub async fn course_link(&self, course_title: &str) -> Result<Option<String>> {
        Ok(self
            .vector_store
            .get_course(course_title)
            .await?
            .and_then(|c| c.course_link))
    }

    /// All course titles in the catalog, sorted.
    pub async fn course_titles(&self) -> Result<Vec<String>> {
        self.vector_store.course_titles().await
    }

    /// Add a course and its chunks. Chunks of an already-known course are skipped.
    #[instrument(skip(self, course, chunks), fields(title = %course.title))]
    pub async fn import_course(&self, course: &Course, chunks: &[CourseChunk]) -> Result<ImportOutcome> {
        if let Some(stray) = chunks.iter().find(|c| c.course_title != course.title) {
            return Err(SyllabusError::InvalidInput(format!(
                "Chunk {} belongs to '{}', not '{}'",
                stray.chunk_index, stray.course_title, course.title
            )));
        }

        // Embed everything before touching the store so a failure leaves no trace.
        let title_embedding = self.embedder.embed(&course.title).await?;
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(SyllabusError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let embedded: Vec<EmbeddedChunk> = chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();

        if !self
            .vector_store
            .add_course(course, &title_embedding, &embedded)
            .await?
        {
            info!("Course '{}' already indexed, skipping", course.title);
            return Ok(ImportOutcome {
                added: false,
                chunks: 0,
            });
        }

        info!("Indexed course '{}' with {} chunks", course.title, embedded.len());
        Ok(ImportOutcome {
            added: true,
            chunks: embedded.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        chunk, intro_to_python, seeded_store, BatchFailingEmbedder, FailingEmbedder, KeywordEmbedder,
    };
    use crate::vector_store::MemoryVectorStore;

    #[test]
    fn test_zero_max_results_is_rejected() {
        let result = CourseStore::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder::new()),
            0,
        );
        assert!(matches!(result, Err(SyllabusError::Config(_))));
    }

    #[tokio::test]
    async fn test_smallest_limit_still_returns_content() {
        let store = seeded_store(1).await;
        let results = store.search("Variables store data", None, None).await;

        assert!(results.error.is_none());
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].content, "Variables store data");
    }

    #[tokio::test]
    async fn test_resolve_course_is_fuzzy() {
        let store = seeded_store(5).await;
        assert_eq!(
            store.resolve_course("python").await.unwrap().as_deref(),
            Some("Intro to Python")
        );
        assert_eq!(
            store.resolve_course("Rust").await.unwrap().as_deref(),
            Some("Rust Fundamentals")
        );
    }

    #[tokio::test]
    async fn test_unknown_course_fails_without_fallback() {
        let store = crate::testing::empty_store();
        let results = store.search("anything", Some("Python"), None).await;

        assert!(results.is_empty());
        assert_eq!(
            results.error.as_deref(),
            Some("No course found matching 'Python'")
        );
    }

    #[tokio::test]
    async fn test_find_course() {
        let store = seeded_store(5).await;
        let course = store.find_course("rust").await.unwrap();
        assert_eq!(course.title, "Rust Fundamentals");

        let missing = crate::testing::empty_store().find_course("rust").await;
        assert!(matches!(missing, Err(SyllabusError::CourseNotFound(name)) if name == "rust"));
    }

    #[tokio::test]
    async fn test_course_and_lesson_filters_combine() {
        let store = seeded_store(5).await;
        let results = store.search("variables", Some("Python"), Some(1)).await;

        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].course_title, "Intro to Python");
        assert_eq!(results.hits[0].lesson_number, Some(1));
    }

    #[tokio::test]
    async fn test_results_ranked_nearest_first() {
        let store = seeded_store(5).await;
        let results = store.search("variables", None, None).await;

        assert_eq!(results.hits.len(), 3);
        for pair in results.hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_becomes_error_result() {
        let store = CourseStore::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(FailingEmbedder),
            5,
        )
        .unwrap();

        let results = store.search("anything", None, None).await;
        assert!(results.is_empty());
        assert!(results.error.unwrap().starts_with("Search error:"));
    }

    #[tokio::test]
    async fn test_lesson_and_course_links() {
        let store = seeded_store(5).await;
        assert_eq!(
            store.lesson_link("Intro to Python", 2).await.unwrap().as_deref(),
            Some("https://example.com/python/2")
        );
        assert_eq!(store.lesson_link("Intro to Python", 9).await.unwrap(), None);
        assert_eq!(
            store.course_link("Rust Fundamentals").await.unwrap().as_deref(),
            Some("https://example.com/rust")
        );
    }

    #[tokio::test]
    async fn test_import_skips_known_course_and_rejects_stray_chunks() {
        let store = seeded_store(5).await;

        let again = store
            .import_course(&intro_to_python(), &[chunk("Intro to Python", Some(1), 5, "dup")])
            .await
            .unwrap();
        assert_eq!(again, ImportOutcome { added: false, chunks: 0 });

        let stray = store
            .import_course(&intro_to_python(), &[chunk("Other", None, 0, "x")])
            .await;
        assert!(matches!(stray, Err(SyllabusError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_failed_import_leaves_nothing_behind() {
        let vector_store = Arc::new(MemoryVectorStore::new());
        let chunks = [chunk("Intro to Python", Some(1), 0, "Variables store data")];

        let flaky = CourseStore::new(vector_store.clone(), Arc::new(BatchFailingEmbedder), 5).unwrap();
        let first = flaky.import_course(&intro_to_python(), &chunks).await;
        assert!(matches!(first, Err(SyllabusError::Embedding(_))));
        assert!(vector_store.course_titles().await.unwrap().is_empty());

        let store = CourseStore::new(vector_store.clone(), Arc::new(KeywordEmbedder::new()), 5).unwrap();
        let retry = store.import_course(&intro_to_python(), &chunks).await.unwrap();
        assert_eq!(retry, ImportOutcome { added: true, chunks: 1 });
        assert_eq!(vector_store.chunk_count().await.unwrap(), 1);

        let results = store.search("Variables", Some("Python"), None).await;
        assert_eq!(results.hits.len(), 1);
    }
}
