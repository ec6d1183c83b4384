//! GET /ask: relays one question to the provider.

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};
use llm_provider::ComposedPrompt;
use tracing::info;

use crate::{
    core::{
        app_state::AppState,
        http::text_response::{text_attachment, text_ok},
    },
    error_handler::AppResult,
    routes::ask::ask_request::AskQuery,
};

/// Handler: GET /ask
///
/// # Example
/// ```bash
/// curl "http://127.0.0.1:3000/ask?q=fizzbuzz%20in%20java&filename=Main.java"
/// ```
pub async fn ask(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AskQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    relay(&state, &query).await
}

/// Validation, credential gate, composition, one provider call, formatting.
///
/// Shared by the server route and the serverless handler. Input and
/// configuration errors return before any network call.
pub async fn relay(state: &AppState, query: &AskQuery) -> AppResult<Response> {
    let question = query.question()?;
    let client = state.client().await?;

    let started = Instant::now();
    let prompt = ComposedPrompt::for_provider(client.provider(), question);
    let answer = client.generate(&prompt).await?;

    info!(
        provider = %client.provider(),
        model = client.model(),
        question_len = question.len(),
        answer_len = answer.len(),
        attachment = query.attachment_name().is_some(),
        latency_ms = started.elapsed().as_millis(),
        "question relayed"
    );

    Ok(match query.attachment_name() {
        Some(name) => text_attachment(answer, name),
        None => text_ok(answer),
    })
}
