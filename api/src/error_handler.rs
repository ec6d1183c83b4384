use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use llm_provider::{AiLlmError, ProviderErrorKind};
use thiserror::Error;
use tracing::{error, warn};

/// Public application error type.
///
/// Every variant renders as a single-line `text/plain` body; nothing
/// structured and no upstream payloads leak to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("invalid configuration: {0}")]
    Config(#[source] AiLlmError),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        reason: &'static str,
    },

    // --- IO / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Error: Missing question parameter. Use ?q=your-question")]
    MissingQuestion,

    #[error("Error: Invalid query string")]
    BadQuery(String),

    #[error("Error: Not found")]
    NotFound,

    // --- Credential / model ---
    #[error("Error: {0} not configured")]
    MissingApiKey(&'static str),

    #[error("Error: No working model available. Restart the server to retry.")]
    NoWorkingModel,

    // --- Upstream ---
    #[error("{}", provider_body(.0))]
    Provider(#[from] AiLlmError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MissingQuestion | AppError::BadQuery(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Provider(err) => match err.provider_kind() {
                Some(ProviderErrorKind::Unauthorized) => StatusCode::UNAUTHORIZED,
                Some(ProviderErrorKind::QuotaExceeded) => StatusCode::TOO_MANY_REQUESTS,
                Some(ProviderErrorKind::SafetyBlocked) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::MissingApiKey(_)
            | AppError::NoWorkingModel
            | AppError::Config(_)
            | AppError::InvalidEnv { .. }
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Caller-visible text for an upstream failure.
fn provider_body(err: &AiLlmError) -> String {
    match err {
        AiLlmError::Provider(p) => match p.kind {
            ProviderErrorKind::Unauthorized => "Error: Invalid API key".into(),
            ProviderErrorKind::QuotaExceeded => "Error: API quota exceeded or rate limit".into(),
            ProviderErrorKind::SafetyBlocked => "Error: Content blocked by safety filters".into(),
            _ => format!("Error: Failed to process request - {}", p.message),
        },
        _ => "Error: Failed to process request".into(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Provider(err) if status.is_server_error() => {
                error!(%status, error = %err, "provider call failed");
            }
            AppError::Provider(err) => {
                warn!(%status, error = %err, "provider rejected request");
            }
            AppError::BadQuery(detail) => {
                warn!(%status, %detail, "malformed query string");
            }
            other if status.is_server_error() => {
                error!(%status, error = %other, "request failed");
            }
            _ => {}
        }
        (status, self.to_string()).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        AppError::BadQuery(err.body_text())
    }
}
