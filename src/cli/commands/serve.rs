//! HTTP API server for the course assistant.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::{CourseAnalytics, QueryResponse, RagSystem};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let rag = Arc::new(RagSystem::from_settings(&settings)?);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Syllabus API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Query", "POST   /api/query");
    Output::kv("Courses", "GET    /api/courses");
    Output::kv("End session", "DELETE /api/session/{id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(rag)).await?;

    Ok(())
}

/// Build the API router over a shared system.
pub fn router(rag: Arc<RagSystem>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/query", post(query))
        .route("/api/courses", get(courses))
        .route("/api/session/{session_id}", delete(end_session))
        .layer(cors)
        .with_state(rag)
}

// === Request/Response Types ===

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionResponse {
    success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    detail: String,
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            detail: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn query(State(rag): State<Arc<RagSystem>>, Json(req): Json<QueryRequest>) -> Response {
    match rag.query(&req.query, req.session_id.as_deref()).await {
        Ok(response) => Json::<QueryResponse>(response).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn courses(State(rag): State<Arc<RagSystem>>) -> Response {
    match rag.course_analytics().await {
        Ok(analytics) => Json::<CourseAnalytics>(analytics).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn end_session(State(rag): State<Arc<RagSystem>>, Path(session_id): Path<String>) -> Response {
    match rag.sessions().clear(&session_id) {
        Ok(_) => Json(SessionResponse { success: true }).into_response(),
        Err(e) => internal_error(e),
    }
}
