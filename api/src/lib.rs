use std::sync::Arc;

pub mod core;
pub mod error_handler;
pub mod routes;
pub mod serverless;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::signal;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
    core::{
        app_state::AppState,
        server_config::{RelayMode, ServerConfig},
    },
    error_handler::AppError,
    routes::{ask::ask_route::ask, health_route::health, root_route::root},
    serverless::{FUNCTION_PATH, ServerlessHandler, function_router},
};

/// Routes of the long-running server.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ask", get(ask))
        .route("/health", get(health))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

/// Adds request tracing and the top-level panic guard.
pub fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(%detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error: Failed to process request",
    )
        .into_response()
}

/// Builds the app for `config.mode`, binds, and serves until Ctrl+C.
pub async fn start(config: ServerConfig) -> Result<(), AppError> {
    let app = match config.mode {
        RelayMode::Server => {
            let state = Arc::new(AppState::from_env()?);
            state.warm_up().await;
            router(state)
        }
        RelayMode::Function => {
            let handler = Arc::new(ServerlessHandler::from_env()?);
            if handler.state().settings.api_key.is_none() {
                let var = handler.state().settings.provider.api_key_var();
                warn!(var, "API key environment variable not set; invocations will fail");
            }
            function_router(handler).fallback(not_found)
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .map_err(AppError::Bind)?;

    info!(addr = %config.bind_addr(), mode = %config.mode, "server running");
    match config.mode {
        RelayMode::Server => info!(
            "usage: curl \"http://localhost:{}/ask?q=your-question\"",
            config.port
        ),
        RelayMode::Function => info!(
            "usage: curl \"http://localhost:{}{FUNCTION_PATH}?q=your-question\"",
            config.port
        ),
    }

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, with_layers(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
