//! HTTP API gateway for enamAI.
//!
//! Exposes the service banner, a liveness check, and the v1 chat API.
//! Built on Axum.

pub mod api_v1;

use axum::{Router, extract::State, http::HeaderValue, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::{info, warn};

use enamai_agent::{ChatService, DomainBriefing};
use enamai_config::AppConfig;
use enamai_memory::InMemorySessionStore;
use enamai_providers::ProviderStatus;

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub chat: ChatService,
    /// Outcome of provider initialization, reported by the health checks
    pub provider_status: ProviderStatus,
}

pub type SharedState = Arc<AppState>;

/// Build the full application state from configuration.
///
/// The session store and provider are created once here and shared by every
/// request. A provider that fails to initialize does not stop the service.
pub fn build_state(config: AppConfig) -> SharedState {
    let provider_status = enamai_providers::initialize(&config);
    let store = Arc::new(
        InMemorySessionStore::new(config.clinic.persona.clone())
            .with_max_turns(config.sessions.max_turns)
            .with_context_turns(config.sessions.context_turns),
    );

    let chat = ChatService::new(
        provider_status.provider(),
        store,
        DomainBriefing::from_clinic(&config.clinic),
    )
    .with_parameters(config.prediction)
    .with_timeout(Duration::from_secs(config.vertex.timeout_secs));

    Arc::new(AppState {
        config,
        chat,
        provider_status,
    })
}

/// Build the router with all routes and middleware.
///
/// Layers applied:
/// - CORS restricted to the configured origins
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.allowed_origins);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/api/v1", api_v1::v1_router(state))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS for the configured origins. Credentials are allowed, so request
/// headers are mirrored rather than wildcarded.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> enamai_core::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    info!(app = %config.app_name, "Starting up");
    let state = build_state(config);
    if let Some(reason) = state.provider_status.reason() {
        warn!(reason = %reason, "Prediction provider unavailable, serving fallback responses");
    } else {
        info!("All services initialized successfully");
    }

    let app = build_router(state);

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct RootResponse {
    name: String,
    version: &'static str,
    status: &'static str,
    docs: &'static str,
}

async fn root_handler(State(state): State<SharedState>) -> Json<RootResponse> {
    Json(RootResponse {
        name: state.config.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        status: "healthy",
        docs: "/api/v1",
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceStatuses,
}

#[derive(Serialize)]
struct ServiceStatuses {
    vertex_ai: &'static str,
    api: &'static str,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        services: ServiceStatuses {
            vertex_ai: if state.provider_status.is_ready() {
                "initialized"
            } else {
                "unavailable"
            },
            api: "running",
        },
    })
}
