//! Serverless shape of the relay.
//!
//! A [`ServerlessHandler`] is a single function-style entry point: it accepts
//! any method, enforces GET itself, and builds the provider client on the
//! first call. The client is then reused by every later invocation served by
//! the same instance. No startup probe runs in this shape.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, Request, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::any,
};
use llm_provider::ProviderSettings;
use tracing::debug;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::ask::{ask_request::AskQuery, ask_route::relay},
};

/// Path the handler is mounted at by [`function_router`].
pub const FUNCTION_PATH: &str = "/api/ask";

#[derive(Debug)]
pub struct ServerlessHandler {
    state: AppState,
}

impl ServerlessHandler {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            state: AppState::for_function(settings),
        }
    }

    /// Reads provider settings from the environment.
    pub fn from_env() -> AppResult<Self> {
        let settings = ProviderSettings::from_env().map_err(AppError::Config)?;
        Ok(Self::new(settings))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handles one invocation.
    pub async fn call<B>(&self, req: Request<B>) -> Response {
        debug!(method = %req.method(), uri = %req.uri(), "function invoked");

        if req.method() != Method::GET {
            return AppError::MethodNotAllowed.into_response();
        }

        let query = match Query::<AskQuery>::try_from_uri(req.uri()) {
            Ok(Query(query)) => query,
            Err(rejection) => return AppError::from(rejection).into_response(),
        };

        relay(&self.state, &query).await.into_response()
    }
}

async fn invoke(State(handler): State<Arc<ServerlessHandler>>, req: Request) -> Response {
    handler.call(req).await
}

/// Mounts `handler` at [`FUNCTION_PATH`] for every method.
pub fn function_router(handler: Arc<ServerlessHandler>) -> Router {
    Router::new()
        .route(FUNCTION_PATH, any(invoke))
        .with_state(handler)
}
