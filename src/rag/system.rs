//! Query facade wiring the agent, course store and sessions together.

use super::CourseStore;
use crate::agent::{
    Agent, CourseOutlineTool, CourseSearchTool, OpenAIProvider, Source, ToolDefinition, ToolRegistry,
};
use crate::config::{Settings, VectorStoreProvider};
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::session::SessionStore;
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Answer to one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub session_id: String,
}

/// Catalog summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// Entry point for answering course questions.
pub struct RagSystem {
    agent: Agent,
    store: Arc<CourseStore>,
    tools: ToolRegistry,
    sessions: SessionStore,
}

impl RagSystem {
    /// Create a system with the search and outline tools registered.
    pub fn new(agent: Agent, store: Arc<CourseStore>, sessions: SessionStore) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CourseSearchTool::new(store.clone())));
        tools.register(Arc::new(CourseOutlineTool::new(store.clone())));

        Self {
            agent,
            store,
            tools,
            sessions,
        }
    }

    /// Build the production system: OpenAI completions and embeddings over
    /// the configured vector store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let vector_store: Arc<dyn VectorStore> = match settings.vector_store.provider {
            VectorStoreProvider::Sqlite => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
            VectorStoreProvider::Memory => Arc::new(MemoryVectorStore::new()),
        };
        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let store = Arc::new(CourseStore::new(
            vector_store,
            embedder,
            settings.vector_store.max_results,
        )?);

        let provider = Arc::new(OpenAIProvider::from_settings(&settings.completion)?);
        let agent = Agent::new(provider)
            .with_temperature(settings.completion.temperature)
            .with_max_tokens(settings.completion.max_tokens);

        info!(
            "Using {} with {} vector store",
            settings.completion.model, settings.vector_store.provider
        );

        Ok(Self::new(
            agent,
            store,
            SessionStore::new(settings.session.max_history),
        ))
    }

    /// Answer a query within a session, minting a session id when none is given.
    #[instrument(skip(self))]
    pub async fn query(&self, query: &str, session_id: Option<&str>) -> Result<QueryResponse> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create()?,
        };
        let history = self.sessions.history(&session_id)?;

        let mut tools = self.tools.fork();
        let response = self
            .agent
            .run(query, history.as_deref(), Some(&mut tools))
            .await?;
        let sources = tools.take_sources();

        self.sessions.append(&session_id, query, &response.content)?;

        Ok(QueryResponse {
            answer: response.content,
            sources,
            session_id,
        })
    }

    pub async fn course_analytics(&self) -> Result<CourseAnalytics> {
        let course_titles = self.store.course_titles().await?;
        Ok(CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        })
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn store(&self) -> &Arc<CourseStore> {
        &self.store
    }
}
