//! HTTP surface: `POST /query` and `GET /health`

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use hive_core::{Agent, Context};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for all requests
#[derive(Clone)]
pub struct AppState {
    pub root: Arc<dyn Agent>,
}

impl AppState {
    pub fn new(root: Arc<dyn Agent>) -> Self {
        Self { root }
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, agent = %state.root.name(), "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Bind `addr` and serve
pub async fn run(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// The query text; anything other than a string `query` field reads as empty
fn query_text(body: &Value) -> String {
    body.get("query")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// POST /query
async fn query_handler(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let query = query_text(&body);
    let request_id = uuid::Uuid::new_v4().to_string();
    let mut context = Context::new().with_request_id(request_id.clone());
    let started = Instant::now();

    info!(request_id = %request_id, query_length = query.len(), "Query received");

    match state.root.process(query, &mut context).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                elapsed_ms = millis(started.elapsed()),
                response_length = response.len(),
                "Query answered"
            );
            (StatusCode::OK, Json(json!({ "response": response }))).into_response()
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Saturates instead of wrapping for absurd durations
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

// GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text() {
        assert_eq!(query_text(&json!({"query": "price of NVDA"})), "price of NVDA");
        assert_eq!(query_text(&json!({})), "");
        assert_eq!(query_text(&json!({"query": 42})), "");
        assert_eq!(query_text(&json!({"query": null})), "");
        assert_eq!(query_text(&json!(["query"])), "");
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
