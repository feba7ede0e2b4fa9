//! HTTP API v1 — patient chat.
//!
//! Endpoints:
//!
//! - `POST /api/v1/chat`          — Send a message, get a response
//! - `GET  /api/v1/chat/health`   — Chat service readiness

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use enamai_core::error::Error;
use enamai_core::message::{ChatRequest, ChatResponse};

use crate::SharedState;

/// Build the v1 API router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/chat/health", get(chat_health_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
    timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ChatHealthResponse {
    Healthy {
        status: &'static str,
        service: &'static str,
        model: String,
        active_sessions: usize,
    },
    Unhealthy {
        status: &'static str,
        service: &'static str,
        error: String,
    },
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(status = %rejection.status(), "v1/chat body rejected");
        (
            rejection.status(),
            Json(ErrorResponse::new("Invalid request body", rejection.body_text())),
        )
    })?;

    if let Err(e) = payload.validate() {
        let detail = match e {
            Error::Validation(detail) => detail,
            other => other.to_string(),
        };
        warn!(detail = %detail, "v1/chat rejected");
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("Validation error", detail)),
        ));
    }

    info!(session = ?payload.session_id(), "v1/chat request");
    Ok(Json(state.chat.handle(&payload).await))
}

async fn chat_health_handler(State(state): State<SharedState>) -> Response {
    match state.provider_status.reason() {
        None => {
            let active_sessions = state.chat.store().session_count().await;
            Json(ChatHealthResponse::Healthy {
                status: "healthy",
                service: "chat",
                model: state.provider_status.model().to_string(),
                active_sessions,
            })
            .into_response()
        }
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ChatHealthResponse::Unhealthy {
                status: "unhealthy",
                service: "chat",
                error: reason.to_string(),
            }),
        )
            .into_response(),
    }
}
