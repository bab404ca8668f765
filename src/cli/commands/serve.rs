//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for drafting replies to comments.

use crate::agents::{FilterDecision, Route};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::coordinator::Coordinator;
use crate::error::CommentaryError;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    coordinator: Coordinator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Respond, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }
    for missing in preflight::missing_resources(&settings) {
        Output::warning(&missing);
    }

    let state = Arc::new(AppState {
        coordinator: Coordinator::new(&settings)?,
    });

    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Commentary API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Respond", "POST /respond");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/respond", post(respond))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct RespondRequest {
    comment: String,
}

#[derive(Serialize)]
struct RespondResponse {
    run_id: String,
    filter: FilterDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<Route>,
    response: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn respond(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RespondRequest>,
) -> impl IntoResponse {
    match state.coordinator.process(&req.comment).await {
        Ok(outcome) => Json(RespondResponse {
            run_id: outcome.run_id.to_string(),
            filter: outcome.filter,
            route: outcome.route,
            response: outcome.response.into_string(),
        })
        .into_response(),
        Err(e) => {
            warn!("Run failed: {}", e);
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// HTTP status for a failed run.
fn status_for(error: &CommentaryError) -> StatusCode {
    match error {
        CommentaryError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        CommentaryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CommentaryError::ResourceNotFound(_) | CommentaryError::Config(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        CommentaryError::Service { .. }
        | CommentaryError::RetryExhausted { .. }
        | CommentaryError::MalformedOutput { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
