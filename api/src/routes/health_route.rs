use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::core::{app_state::AppState, http::text_response::text_ok};

/// Handler: GET /health
///
/// Reports what the model slot settled on without making a provider call:
/// `ok model=<id>`, `ok model=unresolved` before the client exists, or 503
/// after a failed startup probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    if state.no_working_model() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Error: No working model available",
        )
            .into_response();
    }
    let model = state.active_model().unwrap_or("unresolved");
    text_ok(format!("ok provider={} model={model}", state.settings.provider))
}
