//! An axum app impersonating every third-party API the agents call.
//!
//! Each provider lives under its own path prefix so one listener can stand in
//! for all of them. Hits are counted per route.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Bytes returned (base64 encoded) by the fake image endpoint.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Accepted Imgflip credentials.
pub const IMGFLIP_USER: &str = "meme-user";
pub const IMGFLIP_PASS: &str = "meme-pass";

#[derive(Clone, Default)]
struct Hits(Arc<Mutex<HashMap<&'static str, usize>>>);

impl Hits {
    fn record(&self, route: &'static str) {
        *self.0.lock().entry(route).or_insert(0) += 1;
    }
}

pub struct FakeUpstream {
    pub addr: SocketAddr,
    hits: Hits,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeUpstream {
    pub async fn spawn() -> std::io::Result<Self> {
        let hits = Hits::default();
        let app = router(hits.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            hits,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    pub fn hits(&self, route: &str) -> usize {
        self.hits.0.lock().get(route).copied().unwrap_or(0)
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn router(hits: Hits) -> Router {
    Router::new()
        .route("/imgflip/get_memes", get(imgflip_get_memes))
        .route("/imgflip/caption_image", post(imgflip_caption_image))
        .route("/reddit/memes.json", get(reddit_listing))
        .route("/memegen/templates/", get(memegen_templates))
        .route("/slow", get(slow))
        .route("/openai/chat/completions", post(openai_chat))
        .route("/openai/embeddings", post(openai_embeddings))
        .route("/openai/moderations", post(openai_moderations))
        .route("/openai/images/generations", post(openai_images))
        .route("/hf/{*model}", post(huggingface))
        .route("/deepai", post(deepai))
        .route("/perspective", post(perspective))
        .route("/ideas/jokeapi", get(idea_jokeapi))
        .route("/ideas/dadjoke", get(idea_dadjoke))
        .route("/ideas/quotable", get(idea_broken))
        .route("/ideas/zenquotes", get(idea_zenquotes))
        .route("/ideas/advice", get(idea_advice))
        .with_state(hits)
}

async fn imgflip_get_memes(State(hits): State<Hits>) -> Json<Value> {
    hits.record("imgflip/get_memes");
    Json(json!({
        "success": true,
        "data": {"memes": [
            {"id": "181913649", "name": "Drake Hotline Bling", "url": "https://i.imgflip.com/30b1gx.jpg", "box_count": 2},
            {"id": "87743020", "name": "Two Buttons", "url": "https://i.imgflip.com/1g8my4.jpg", "box_count": 3},
            {"id": "129242436", "name": "Change My Mind", "url": "https://i.imgflip.com/24y43o.jpg", "box_count": 2}
        ]}
    }))
}

async fn imgflip_caption_image(
    State(hits): State<Hits>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    hits.record("imgflip/caption_image");
    let user = form.get("username").map(String::as_str);
    let pass = form.get("password").map(String::as_str);
    if user == Some(IMGFLIP_USER) && pass == Some(IMGFLIP_PASS) {
        let id = form.get("template_id").cloned().unwrap_or_default();
        Json(json!({
            "success": true,
            "data": {"url": format!("https://i.imgflip.com/made-{id}.jpg"), "page_url": "https://imgflip.com/i/x"}
        }))
    } else {
        Json(json!({"success": false, "error_message": "Invalid username/password combination"}))
    }
}

async fn reddit_listing(State(hits): State<Hits>) -> Json<Value> {
    hits.record("reddit");
    Json(json!({
        "kind": "Listing",
        "data": {"children": [
            {"data": {"id": "abc", "title": "When the build is green", "url": "https://i.redd.it/abc.png", "post_hint": "image"}},
            {"data": {"id": "self1", "title": "Discussion thread", "url": "https://www.reddit.com/r/memes/comments/self1"}},
            {"data": {"id": "dup", "title": "Drake again", "url": "https://i.imgflip.com/30b1gx.jpg"}}
        ]}
    }))
}

async fn memegen_templates(State(hits): State<Hits>) -> Json<Value> {
    hits.record("memegen/templates");
    Json(json!([
        {"id": "drake", "name": "Drakeposting", "blank": "https://api.memegen.link/images/drake.png"},
        {"id": "fry", "name": "Futurama Fry", "blank": ""}
    ]))
}

async fn slow(State(hits): State<Hits>) -> Json<Value> {
    hits.record("slow");
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"data": {"children": []}}))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "bad key"}})),
    )
        .into_response()
}

fn chat_reply(system: &str) -> String {
    if system.contains("meme planner") {
        "Here is your plan:\n```json\n{\"image_prompt\": \"A tidy desk at dawn with space for text\", \
         \"captions\": [\"ME AT 9AM // ME AT 9:05\", \"COFFEE // MORE COFFEE\"]}\n```"
            .to_string()
    } else if system.contains("search queries") {
        json!({"search_prompt": "tired office worker", "tags": ["Office", "tired"]}).to_string()
    } else {
        "1. WHEN THE TESTS PASS // ON THE FIRST TRY\n2. ME // ALSO ME".to_string()
    }
}

async fn openai_chat(
    State(hits): State<Hits>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    hits.record("openai/chat");
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let message = |role: &str| {
        body["messages"]
            .as_array()
            .and_then(|m| m.iter().find(|m| m["role"] == role))
            .and_then(|m| m["content"].as_str())
            .unwrap_or_default()
            .to_string()
    };
    let content = chat_reply(&message("system"));

    Json(json!({
        "id": "chatcmpl-fake",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop",
            "logprobs": null
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 10, "total_tokens": 20}
    }))
    .into_response()
}

/// Letter-frequency vector, so texts sharing words land close together.
fn letter_vector(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; 26];
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() {
            vector[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    vector
}

async fn openai_embeddings(
    State(hits): State<Hits>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    hits.record("openai/embeddings");
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let inputs: Vec<String> = body["input"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    // Reverse order: clients must sort by index.
    let data: Vec<Value> = inputs
        .iter()
        .enumerate()
        .rev()
        .map(|(index, text)| json!({"object": "embedding", "index": index, "embedding": letter_vector(text)}))
        .collect();

    Json(json!({"object": "list", "data": data, "model": body["model"]})).into_response()
}

async fn openai_moderations(
    State(hits): State<Hits>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    hits.record("openai/moderations");
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let flagged = body["input"]
        .as_str()
        .is_some_and(|t| t.to_lowercase().contains("forbidden"));
    Json(json!({"id": "modr-fake", "results": [{"flagged": flagged}]})).into_response()
}

async fn openai_images(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    hits.record("openai/images");
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(FAKE_PNG);
    Json(json!({"created": 1, "data": [{"b64_json": encoded}]})).into_response()
}

async fn huggingface(
    State(hits): State<Hits>,
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let text = body["inputs"].as_str().unwrap_or_default().to_lowercase();
    if model.contains("toxic") {
        hits.record("hf/toxicity");
        let score = if text.contains("nasty") { 0.95 } else { 0.02 };
        Json(json!([[
            {"label": "toxic", "score": score},
            {"label": "insult", "score": 0.01}
        ]]))
    } else {
        hits.record("hf/generate");
        Json(json!([{"generated_text": "monday again // still monday"}]))
    }
}

async fn deepai(
    State(hits): State<Hits>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    hits.record("deepai");
    if headers.get("api-key").is_none() {
        return unauthorized();
    }
    let text = form.get("text").cloned().unwrap_or_default();
    Json(json!({"id": "x", "output": format!("{} // deep thoughts", text.len())})).into_response()
}

async fn perspective(
    State(hits): State<Hits>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    hits.record("perspective");
    if !query.contains_key("key") {
        return unauthorized();
    }
    let text = body["comment"]["text"].as_str().unwrap_or_default().to_lowercase();
    let score = if text.contains("jerk") { 0.91 } else { 0.05 };
    Json(json!({
        "attributeScores": {"TOXICITY": {"summaryScore": {"value": score, "type": "PROBABILITY"}}},
        "languages": ["en"]
    }))
    .into_response()
}

async fn idea_jokeapi(State(hits): State<Hits>) -> Json<Value> {
    hits.record("ideas/jokeapi");
    Json(json!({"error": false, "type": "single", "joke": "I would tell a UDP joke, but you might not get it."}))
}

async fn idea_dadjoke(State(hits): State<Hits>) -> Json<Value> {
    hits.record("ideas/dadjoke");
    Json(json!({"id": "R7UfaahVfFd", "joke": "My dog used to chase people on a bike.", "status": 200}))
}

async fn idea_broken(State(hits): State<Hits>) -> Response {
    hits.record("ideas/quotable");
    (StatusCode::SERVICE_UNAVAILABLE, "down").into_response()
}

async fn idea_zenquotes(State(hits): State<Hits>) -> Json<Value> {
    hits.record("ideas/zenquotes");
    Json(json!([{"q": "Simplicity is the soul of efficiency.", "a": "Austin Freeman"}]))
}

async fn idea_advice(State(hits): State<Hits>) -> Json<Value> {
    hits.record("ideas/advice");
    Json(json!({"slip": {"id": 42, "advice": "Never trust a deploy on Friday."}}))
}
