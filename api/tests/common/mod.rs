#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use api::core::app_state::AppState;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use http_body_util::BodyExt;
use llm_provider::{LlmProvider, ProviderSettings};
use serde_json::{Value, json};

pub const VERBATIM_ANSWER: &str = "class Main {\n  // caf\u{e9} \u{1f980}\n}\n\n  ";

#[derive(Clone, Default)]
pub struct Upstream {
    pub hits: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Behaviour keyed on the question text, so one mock serves every scenario.
fn scripted(question: &str) -> Result<String, Response> {
    match question {
        "auth" => Err(error(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "Invalid API Key", "code": "invalid_api_key" } }),
        )),
        "quota" => Err(error(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "Rate limit reached", "code": "rate_limit_exceeded" } }),
        )),
        "unsafe" => Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "error": { "message": "blocked", "code": "content_filter" } }),
        )),
        "crash" => Err(error(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": { "message": "upstream exploded" } }),
        )),
        "verbatim" => Ok(VERBATIM_ANSWER.to_string()),
        other => Ok(format!("answer:{other}")),
    }
}

async fn groq_chat(State(up): State<Upstream>, Json(body): Json<Value>) -> Response {
    up.hits.fetch_add(1, Ordering::SeqCst);
    if body["model"] != "good" {
        return error(
            StatusCode::NOT_FOUND,
            json!({ "error": { "message": "model not found" } }),
        );
    }
    let question = body["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default();
    match scripted(question) {
        Ok(text) => Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }]
        }))
        .into_response(),
        Err(resp) => resp,
    }
}

async fn gemini_generate(
    State(up): State<Upstream>,
    Path(rest): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    up.hits.fetch_add(1, Ordering::SeqCst);
    if rest != "good:generateContent" {
        return error(
            StatusCode::NOT_FOUND,
            json!({ "error": { "code": 404, "message": "model not found", "status": "NOT_FOUND" } }),
        );
    }
    let text = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    let question = text.rsplit("User request: ").next().unwrap_or_default();
    match scripted(question) {
        Ok(answer) => Json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": answer }] }, "finishReason": "STOP" }]
        }))
        .into_response(),
        Err(resp) => resp,
    }
}

pub async fn spawn_upstream() -> (String, Upstream) {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(groq_chat))
        .route("/v1beta/models/{*rest}", post(gemini_generate))
        .with_state(upstream.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), upstream)
}

pub fn settings(provider: LlmProvider, endpoint: &str, candidates: &[&str]) -> ProviderSettings {
    ProviderSettings::new(provider)
        .with_endpoint(endpoint)
        .with_candidates(candidates.iter().copied())
        .with_api_key("test-key")
        .with_probe(false)
}

pub fn state(settings: ProviderSettings) -> Arc<AppState> {
    Arc::new(AppState::new(settings))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
