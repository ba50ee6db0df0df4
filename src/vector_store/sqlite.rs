//! SQLite-based vector store implementation.
//!
//! Metadata filters run in SQL; cosine distance is computed in Rust over the
//! filtered rows. Adequate for course catalogs of a few thousand chunks.

use super::{
    cosine_distance, rank_matches, ChunkFilter, ChunkMatch, Course, CourseChunk, CourseMatch,
    EmbeddedChunk, Lesson, VectorStore,
};
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS courses (
        title TEXT PRIMARY KEY,
        course_link TEXT,
        instructor TEXT,
        lessons_json TEXT NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chunks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_title TEXT NOT NULL,
        lesson_number INTEGER,
        chunk_index INTEGER NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_course ON chunks(course_title, lesson_number);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a SQLite vector store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SyllabusError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, course, title_embedding, chunks), fields(title = %course.title, chunks = chunks.len()))]
    async fn add_course(
        &self,
        course: &Course,
        title_embedding: &[f32],
        chunks: &[EmbeddedChunk],
    ) -> Result<bool> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let lessons_json = serde_json::to_string(&course.lessons)?;
        let inserted = tx.execute(
            r#"
            INSERT OR IGNORE INTO courses (title, course_link, instructor, lessons_json, embedding)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                course.title,
                course.course_link,
                course.instructor,
                lessons_json,
                Self::embedding_to_bytes(title_embedding),
            ],
        )?;

        if inserted == 0 {
            debug!("Course already present, nothing stored");
            return Ok(false);
        }

        for embedded in chunks {
            tx.execute(
                r#"
                INSERT INTO chunks (course_title, lesson_number, chunk_index, content, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    embedded.chunk.course_title,
                    embedded.chunk.lesson_number,
                    embedded.chunk.chunk_index,
                    embedded.chunk.content,
                    Self::embedding_to_bytes(&embedded.embedding),
                ],
            )?;
        }

        tx.commit()?;
        info!("Stored course with {} chunks", chunks.len());
        Ok(true)
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        filter: &ChunkFilter,
        limit: usize,
    ) -> Result<Vec<ChunkMatch>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT course_title, lesson_number, chunk_index, content, embedding
            FROM chunks
            WHERE (?1 IS NULL OR course_title = ?1)
              AND (?2 IS NULL OR lesson_number = ?2)
            "#,
        )?;

        let rows = stmt.query_map(params![filter.course_title, filter.lesson_number], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            Ok(EmbeddedChunk {
                chunk: CourseChunk {
                    course_title: row.get(0)?,
                    lesson_number: row.get(1)?,
                    chunk_index: row.get(2)?,
                    content: row.get(3)?,
                },
                embedding: Self::bytes_to_embedding(&embedding_bytes),
            })
        })?;

        let mut matches = Vec::new();
        for row in rows {
            let embedded = row?;
            matches.push(ChunkMatch {
                distance: cosine_distance(query_embedding, &embedded.embedding),
                chunk: embedded.chunk,
            });
        }

        let ranked = rank_matches(matches, limit);
        debug!("Found {} matching chunks", ranked.len());
        Ok(ranked)
    }

    #[instrument(skip(self, query_embedding))]
    async fn nearest_course(&self, query_embedding: &[f32]) -> Result<Option<CourseMatch>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT title, embedding FROM courses")?;
        let rows = stmt.query_map([], |row| {
            let title: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(1)?;
            Ok((title, Self::bytes_to_embedding(&embedding_bytes)))
        })?;

        let mut best: Option<CourseMatch> = None;
        for row in rows {
            let (title, embedding) = row?;
            let distance = cosine_distance(query_embedding, &embedding);
            if best.as_ref().map_or(true, |b| distance < b.distance) {
                best = Some(CourseMatch { title, distance });
            }
        }

        Ok(best)
    }

    #[instrument(skip(self))]
    async fn get_course(&self, title: &str) -> Result<Option<Course>> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                "SELECT title, course_link, instructor, lessons_json FROM courses WHERE title = ?1",
                params![title],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((title, course_link, instructor, lessons_json)) => {
                let lessons: Vec<Lesson> = serde_json::from_str(&lessons_json)?;
                Ok(Some(Course {
                    title,
                    course_link,
                    instructor,
                    lessons,
                }))
            }
            None => Ok(None),
        }
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT title FROM courses ORDER BY title")?;
        let titles = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(titles)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM chunks; DELETE FROM courses;")?;
        info!("Cleared course catalog and chunk index");
        Ok(())
    }
}
