use std::sync::Arc;

use axum::{extract::State, response::Response};

use crate::core::{app_state::AppState, http::text_response::text_ok};

/// Handler: GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Response {
    text_ok(format!(
        "{} Backend Server is running! Use /ask?q=your-question to query AI.",
        state.settings.provider
    ))
}
