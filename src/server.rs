//! HTTP surface for Yogi.
//!
//! A single `POST /ask` endpoint plus a health probe. Requests are handled
//! concurrently by the runtime; the engine and its clients are shared
//! behind an `Arc` and hold no per-request state.

use crate::cli::Output;
use crate::config::Settings;
use crate::engine::{AskEngine, AskInput};
use crate::error::YogiError;
use crate::prompt::ChatTurn;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error};

/// Fixed user-facing message when every generation candidate failed.
const SERVER_BUSY_MESSAGE: &str =
    "YogiAI is taking a deep breath (Server Busy). Please try again.";

/// Shared application state.
struct AppState {
    engine: AskEngine,
}

/// Run the HTTP server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let engine = AskEngine::from_settings(&settings)?;
    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state, &settings).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Yogi API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>, settings: &Settings) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        // Base64 audio payloads run into the tens of MB.
        .layer(DefaultBodyLimit::max(
            settings.server.body_limit_mb * 1024 * 1024,
        ))
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    history: Vec<ChatTurn>,
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<crate::retrieval::PoseSource>,
    #[serde(rename = "isUnsafe")]
    is_unsafe: bool,
    #[serde(rename = "safetyFlags")]
    safety_flags: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    if let Some(audio) = &req.audio {
        debug!("Audio data present ({} base64 chars)", audio.len());
    }
    if let Some(query) = &req.query {
        debug!("Text query: {}", query);
    }

    let input = AskInput {
        query: req.query,
        history: req.history,
        audio: req.audio,
    };

    match state.engine.ask(input).await {
        Ok(outcome) => Json(AskResponse {
            answer: outcome.answer,
            sources: outcome.sources,
            is_unsafe: outcome.is_unsafe,
            safety_flags: outcome.safety_flags,
        })
        .into_response(),
        Err(YogiError::InvalidInput(reason)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: reason }),
        )
            .into_response(),
        Err(YogiError::AllModelsFailed(failures)) => {
            // Per-candidate reasons stay in the logs; the caller gets the
            // fixed apology.
            for failure in &failures {
                error!("Candidate exhausted - {}", failure);
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: SERVER_BUSY_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: SERVER_BUSY_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_request_all_fields_optional() {
        let req: AskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_none());
        assert!(req.history.is_empty());
        assert!(req.audio.is_none());
    }

    #[test]
    fn test_ask_response_wire_casing() {
        let response = AskResponse {
            answer: "Breathe.".to_string(),
            sources: Vec::new(),
            is_unsafe: true,
            safety_flags: vec!["pain".to_string()],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["isUnsafe"], true);
        assert_eq!(json["safetyFlags"][0], "pain");
        assert!(json["sources"].is_array());
    }
}
