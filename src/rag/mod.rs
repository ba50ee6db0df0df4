//! Retrieval-augmented question answering over course materials.

mod catalog;
mod store;
mod system;

pub use catalog::{Catalog, CatalogChunk, CatalogCourse, ImportSummary};
pub use store::{CourseStore, ImportOutcome, SearchHit, SearchResults};
pub use system::{CourseAnalytics, QueryResponse, RagSystem};
