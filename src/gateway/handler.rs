use axum::{
    Json,
    extract::{
        Query, Request, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::MEMEFORGE_STATUS_HEADER;
use super::error::GatewayError;
use super::payload::{
    CaptionsQuery, CheckRequest, CheckResponse, PlanRequest, SearchPayload, SecureRequest,
    SecureResponse, SecureTemplatesPayload, TemplatesQuery, TemplatesResponse,
};
use super::state::HandlerState;
use crate::generator::GenerateRequest;
use crate::hashing::hash_client_signature;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity used for rate limiting: API key, then first forwarded address,
/// then `anonymous`, combined with the user agent.
pub fn client_signature(headers: &HeaderMap) -> u64 {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let identity = header(API_KEY_HEADER)
        .or_else(|| {
            header(FORWARDED_FOR_HEADER)
                .and_then(|v| v.split(',').next())
                .map(str::trim)
        })
        .unwrap_or("anonymous");
    let user_agent = header("user-agent").unwrap_or_default();

    hash_client_signature(identity, user_agent)
}

/// Rate-limit admission for every `/v1` route.
pub async fn admit(
    State(state): State<HandlerState>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let signature = client_signature(request.headers());
    if let Err(e) = state.limiter.check(signature) {
        warn!(signature, retry_after = e.retry_after_secs(), "Request rejected by rate limiter");
        return Err(e.into());
    }
    Ok(next.run(request).await)
}

fn respond<T: Serialize>(memeforge_status: &'static str, body: T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        MEMEFORGE_STATUS_HEADER,
        HeaderValue::from_static(memeforge_status),
    );
    (StatusCode::OK, headers, Json(body)).into_response()
}

fn status_for_source(source: &str) -> &'static str {
    if source == "fallback" { "fallback" } else { "ok" }
}

fn parse_body<T: DeserializeOwned>(
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<T, GatewayError> {
    let Json(value) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    parse_value(value)
}

fn parse_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(value)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, GatewayError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GatewayError::InvalidRequest(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value)
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Internal(e.to_string()))
}

#[instrument(skip(state))]
pub async fn ideas_handler(State(state): State<HandlerState>) -> Response {
    let idea = state.orchestrator.get_idea().await;
    respond(status_for_source(&idea.source), idea)
}

#[instrument(skip(state, query))]
pub async fn templates_handler(
    State(state): State<HandlerState>,
    query: Result<Query<TemplatesQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Query(query) = query.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let tags = query.tag_list();

    let templates = state
        .orchestrator
        .get_templates(&query.prompt, query.k, &tags)
        .await?;
    debug!(returned = templates.len(), "Templates ranked");
    Ok(respond("ok", TemplatesResponse { templates }))
}

#[instrument(skip(state, query))]
pub async fn captions_handler(
    State(state): State<HandlerState>,
    query: Result<Query<CaptionsQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Query(query) = query.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let prompt = require_text("prompt", &query.prompt)?;

    let suggestions = state
        .orchestrator
        .suggest_captions(prompt, query.template)
        .await;
    Ok(respond(status_for_source(&suggestions.source), suggestions))
}

fn validate_generate(request: &GenerateRequest) -> Result<(), GatewayError> {
    require_text("template_id", &request.template_id)?;
    Ok(())
}

#[instrument(skip(state, body))]
pub async fn generate_handler(
    State(state): State<HandlerState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request: GenerateRequest = parse_body(body)?;
    validate_generate(&request)?;

    let meme = state.orchestrator.generate_meme(&request).await?;
    info!(backend = %meme.backend, "Meme served");
    Ok(respond("ok", meme))
}

#[instrument(skip(state, body))]
pub async fn check_handler(
    State(state): State<HandlerState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request: CheckRequest = parse_body(body)?;

    let verdict = state.orchestrator.check_caption(&request.caption).await;
    let status = verdict.status();
    Ok(respond(
        status,
        CheckResponse {
            status,
            reason: verdict.reason,
        },
    ))
}

#[instrument(skip(state, body))]
pub async fn plan_handler(
    State(state): State<HandlerState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request: PlanRequest = parse_body(body)?;
    let context = require_text("context", &request.context)?;

    let plan = state.orchestrator.plan_meme(context).await;
    Ok(respond("ok", plan))
}

/// Keyed entry point dispatching one action per call.
#[instrument(skip(state, headers, body))]
pub async fn secure_handler(
    State(state): State<HandlerState>,
    headers: HeaderMap,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    if state.requires_key() {
        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);
        if !state.accepts_key(key) {
            warn!("Secure gateway rejected request without a valid key");
            return Err(GatewayError::Unauthorized);
        }
    }

    let request: SecureRequest = parse_body(body)?;
    let orchestrator = &state.orchestrator;
    let payload = request.payload;

    let result = match request.action.trim() {
        "idea" => to_json(&orchestrator.get_idea().await)?,
        "templates" => {
            let payload: SecureTemplatesPayload = parse_optional(payload)?;
            let templates = orchestrator
                .get_templates(&payload.prompt, payload.k, &payload.tags)
                .await?;
            to_json(&TemplatesResponse { templates })?
        }
        "search_templates" => {
            let payload: SearchPayload = parse_optional(payload)?;
            let context = require_text("context", &payload.context)?;
            to_json(&orchestrator.search_templates(context, payload.k).await?)?
        }
        "generate" => {
            let request: GenerateRequest = parse_value(payload)?;
            validate_generate(&request)?;
            to_json(&orchestrator.generate_meme(&request).await?)?
        }
        other => {
            return Err(GatewayError::InvalidRequest(format!(
                "unknown action '{other}'"
            )));
        }
    };

    Ok(respond(
        "ok",
        SecureResponse {
            action: request.action.trim().to_string(),
            result,
        },
    ))
}

fn parse_optional<T: DeserializeOwned + Default>(value: serde_json::Value) -> Result<T, GatewayError> {
    if value.is_null() {
        return Ok(T::default());
    }
    parse_value(value)
}
