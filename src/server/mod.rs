//! HTTP surface for the dispatch service

pub mod dto;

use crate::core::config::DispatchConfig;
use crate::core::error::{DispatchError, Result};
use crate::dispatch::{Dispatcher, ExecutionResult};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use dto::{ApiError, ErrorBody, ExecuteRequest};

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// Build the router: `POST /mcp/execute` and the `GET /` liveness check
pub fn router(dispatcher: Dispatcher) -> Router {
    let state = AppState {
        dispatcher: Arc::new(dispatcher),
    };

    Router::new()
        .route("/", get(root))
        .route("/mcp/execute", post(execute))
        .with_state(state)
}

/// Bind the configured address and serve until interrupted
pub async fn run(config: &DispatchConfig) -> Result<()> {
    config.validate()?;
    let listener = TcpListener::bind(config.listen).await?;
    serve(listener, Dispatcher::new(config)).await
}

/// Serve on an already-bound listener
pub async fn serve(listener: TcpListener, dispatcher: Dispatcher) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "dispatch server listening");
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("dispatch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "K8s MCP Server is running"}))
}

async fn execute(
    State(state): State<AppState>,
    query: std::result::Result<Query<dto::SessionQuery>, QueryRejection>,
    body: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> std::result::Result<Json<ExecutionResult>, ApiError> {
    // The session is checked before the body so a missing id always wins.
    let Query(query) = query.map_err(|e| DispatchError::InvalidParameters(e.body_text()))?;
    let session_id = query
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or(DispatchError::MissingSession)?;

    let Json(request) = body.map_err(|e| DispatchError::InvalidParameters(e.body_text()))?;
    let params = request.params.unwrap_or_default();

    let result = state
        .dispatcher
        .execute(&request.instruction, &params, Some(&session_id))
        .await?;
    Ok(Json(result))
}
