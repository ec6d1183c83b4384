use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use llm_provider::{
    AiLlmError, ComposedPrompt, LlmProvider, ProviderErrorKind, ProviderSettings, build_client,
    probe_candidates,
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Mock {
    hits: Arc<AtomicUsize>,
}

async fn groq_chat(State(mock): State<Mock>, Json(body): Json<Value>) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    match body["model"].as_str() {
        Some("good-model") => {
            let question = body["messages"]
                .as_array()
                .and_then(|m| m.last())
                .and_then(|m| m["content"].as_str())
                .unwrap_or_default()
                .to_string();
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": format!("echo:{question}") }, "finish_reason": "stop" }]
            }))
            .into_response()
        }
        Some("limited-model") => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "message": "Rate limit reached", "code": "rate_limit_exceeded" } })),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": "model does not exist", "code": "model_not_found" } })),
        )
            .into_response(),
    }
}

async fn gemini_generate(
    State(mock): State<Mock>,
    Path(rest): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("gem-key") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT",
                "details": [{ "reason": "API_KEY_INVALID" }] } })),
        )
            .into_response();
    }
    if rest != "gemini-ok:generateContent" {
        return (StatusCode::NOT_FOUND, "no such model").into_response();
    }
    let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    Json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": format!("len={}", text.len()) }] }, "finishReason": "STOP" }]
    }))
    .into_response()
}

async fn spawn_mock() -> (String, Mock) {
    let mock = Mock::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(groq_chat))
        .route("/v1beta/models/{*rest}", post(gemini_generate))
        .with_state(mock.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), mock)
}

fn groq_settings(endpoint: &str, candidates: &[&str]) -> ProviderSettings {
    ProviderSettings::new(LlmProvider::Groq)
        .with_endpoint(endpoint)
        .with_candidates(candidates.iter().copied())
}

#[tokio::test]
async fn probe_picks_first_answering_candidate() {
    let (endpoint, mock) = spawn_mock().await;
    let settings = groq_settings(&endpoint, &["missing-model", "good-model", "never-tried"]);

    let client = probe_candidates(&settings, "k").await.unwrap();

    assert_eq!(client.model(), "good-model");
    assert_eq!(mock.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn probe_reports_no_working_model() {
    let (endpoint, mock) = spawn_mock().await;
    let settings = groq_settings(&endpoint, &["a", "b"]);

    match probe_candidates(&settings, "k").await {
        Err(AiLlmError::NoWorkingModel { tried, .. }) => assert_eq!(tried, vec!["a", "b"]),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(mock.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn connect_without_probe_makes_no_call() {
    let (endpoint, mock) = spawn_mock().await;
    let settings = groq_settings(&endpoint, &["good-model"]);

    let client = build_client(&settings, "k", false).await.unwrap();

    assert_eq!(client.model(), "good-model");
    assert_eq!(mock.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn groq_sends_question_as_user_message() {
    let (endpoint, _mock) = spawn_mock().await;
    let client = build_client(&groq_settings(&endpoint, &["good-model"]), "k", false)
        .await
        .unwrap();

    let answer = client
        .generate(&ComposedPrompt::for_provider(LlmProvider::Groq, "sum two ints"))
        .await
        .unwrap();

    assert_eq!(answer, "echo:sum two ints");
}

#[tokio::test]
async fn groq_rate_limit_is_classified() {
    let (endpoint, _mock) = spawn_mock().await;
    let client = build_client(&groq_settings(&endpoint, &["limited-model"]), "k", false)
        .await
        .unwrap();

    let err = client
        .generate(&ComposedPrompt::for_provider(LlmProvider::Groq, "q"))
        .await
        .unwrap_err();

    assert_eq!(err.provider_kind(), Some(ProviderErrorKind::QuotaExceeded));
}

#[tokio::test]
async fn gemini_sends_composed_text_and_key_header() {
    let (endpoint, _mock) = spawn_mock().await;
    let settings = ProviderSettings::new(LlmProvider::Gemini)
        .with_endpoint(&endpoint)
        .with_candidates(["gemini-ok"]);
    let prompt = ComposedPrompt::for_provider(LlmProvider::Gemini, "hello");

    let client = build_client(&settings, "gem-key", false).await.unwrap();
    let answer = client.generate(&prompt).await.unwrap();
    assert_eq!(answer, format!("len={}", prompt.text().len()));

    let bad = build_client(&settings, "wrong", false).await.unwrap();
    let err = bad.generate(&prompt).await.unwrap_err();
    assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Unauthorized));
}
