//! HTTP gateway (axum) exposing every agent from one router.
//!
//! All `/v1` routes pass the rate limiter first; `/healthz` is never limited.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{
    admit, captions_handler, check_handler, client_signature, generate_handler, ideas_handler,
    plan_handler, secure_handler, templates_handler,
};
pub use state::HandlerState;

use crate::constants::AGENT_NAME;

/// Response header carrying a short machine-readable outcome.
pub const MEMEFORGE_STATUS_HEADER: &str = "X-MemeForge-Status";

/// Agents served by this process, as reported by `/healthz`.
pub const AGENTS: &[&str] = &[
    "ideas",
    "templates",
    "captions",
    "generator",
    "compliance",
    "planner",
];

pub fn create_router_with_state(state: HandlerState) -> Router {
    let v1 = Router::new()
        .route("/ideas", get(ideas_handler))
        .route("/templates", get(templates_handler))
        .route("/captions", get(captions_handler))
        .route("/generate", post(generate_handler))
        .route("/check", post(check_handler))
        .route("/plan", post(plan_handler))
        .route("/secure", post(secure_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), admit));

    Router::new()
        .route("/healthz", get(health_handler))
        .nest("/v1", v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub agent: &'static str,
    pub agents: &'static [&'static str],
    pub idea_sources: usize,
}

#[tracing::instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(MEMEFORGE_STATUS_HEADER, HeaderValue::from_static("ok"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok",
            agent: AGENT_NAME,
            agents: AGENTS,
            idea_sources: state.orchestrator.idea_source_count(),
        }),
    )
        .into_response()
}
