//! Unified error handling for `llm-provider`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library and groups domain-specific errors in nested types ([`ConfigError`],
//! [`ProviderError`]). Every upstream failure is tagged with a
//! [`ProviderErrorKind`] right here, in [`classify_http_failure`], so callers
//! never inspect provider messages or status codes themselves.
//!
//! All messages include the prefix `[LLM Provider]` to simplify attribution in logs.

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::llm_provider::LlmProvider;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `llm-provider` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Classified upstream failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The HTTP client itself could not be built.
    #[error("[LLM Provider] failed to build HTTP client: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Every candidate model failed the startup probe.
    #[error("[LLM Provider] no working {provider} model among: {}", .tried.join(", "))]
    NoWorkingModel {
        /// Provider that was probed.
        provider: LlmProvider,
        /// Candidates in the order they were tried.
        tried: Vec<String>,
    },
}

impl AiLlmError {
    /// Kind of the upstream failure, if this is one.
    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            AiLlmError::Provider(e) => Some(e.kind),
            _ => None,
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (like ports or timeouts).
    #[error("[LLM Provider] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `PORT`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// A flag was not one of the accepted boolean spellings.
    #[error("[LLM Provider] invalid boolean in {var}: expected true/false")]
    InvalidBool {
        /// Variable name.
        var: &'static str,
    },

    /// Unsupported provider in `RELAY_PROVIDER`.
    #[error("[LLM Provider] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[LLM Provider] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `RELAY_PROVIDER_ENDPOINT`).
        var: &'static str,
        /// Explanation.
        reason: &'static str,
    },

    /// Candidate list resolved to no model names.
    #[error("[LLM Provider] model list must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// What went wrong upstream, independent of the provider's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The credential was rejected.
    Unauthorized,
    /// Quota exhausted or rate limited.
    QuotaExceeded,
    /// The prompt or the answer was blocked by content safety filters.
    SafetyBlocked,
    /// Any other non-success response.
    Upstream,
    /// The request never completed (connect, TLS, timeout, body read).
    Transport,
    /// The response could not be decoded.
    Decode,
    /// The response decoded but carried no text.
    EmptyResponse,
    /// Client construction was refused (bad endpoint, missing key).
    InvalidConfig,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderErrorKind::Unauthorized => "unauthorized",
            ProviderErrorKind::QuotaExceeded => "quota exceeded",
            ProviderErrorKind::SafetyBlocked => "blocked by safety filters",
            ProviderErrorKind::Upstream => "upstream error",
            ProviderErrorKind::Transport => "transport error",
            ProviderErrorKind::Decode => "decode error",
            ProviderErrorKind::EmptyResponse => "empty response",
            ProviderErrorKind::InvalidConfig => "invalid client config",
        };
        f.write_str(label)
    }
}

/// A classified upstream failure.
#[derive(Debug, Error)]
#[error("[LLM Provider] {provider} {kind}: {message}")]
pub struct ProviderError {
    /// Provider that produced the failure.
    pub provider: LlmProvider,
    /// Classified kind.
    pub kind: ProviderErrorKind,
    /// HTTP status when the failure came from a response.
    pub status: Option<StatusCode>,
    /// Short, single-line description.
    pub message: String,
}

impl ProviderError {
    /// Creates a new error; `message` is flattened to a single short line.
    pub fn new(provider: LlmProvider, kind: ProviderErrorKind, message: impl AsRef<str>) -> Self {
        Self {
            provider,
            kind,
            status: None,
            message: make_snippet(message.as_ref()),
        }
    }

    /// Attaches the HTTP status of the failed response.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Maps a `reqwest` failure during a call.
    pub fn transport(provider: LlmProvider, err: &reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            ProviderErrorKind::Decode
        } else {
            ProviderErrorKind::Transport
        };
        Self::new(provider, kind, err.to_string())
    }
}

/// Maximum length (in chars) of messages carried in errors.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Collapses whitespace (including newlines) and truncates to
/// [`SNIPPET_MAX_CHARS`] characters.
pub fn make_snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_MAX_CHARS {
        flat
    } else {
        let mut cut: String = flat.chars().take(SNIPPET_MAX_CHARS).collect();
        cut.push('…');
        cut
    }
}

/// Classifies a non-success HTTP response from either provider.
///
/// Both providers wrap failures in `{"error": {...}}`:
/// - Gemini: `{"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT",
///   "details": [{"reason": "API_KEY_INVALID"}]}}`
/// - Groq (OpenAI-compatible): `{"error": {"message": "...", "type": "...", "code": "invalid_api_key"}}`
///
/// The status code wins when it is unambiguous (401/403, 429); otherwise the
/// machine-readable tags and finally the message text are inspected.
pub fn classify_http_failure(provider: LlmProvider, status: StatusCode, body: &str) -> ProviderError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            }
        });

    let mut tags = Vec::new();
    if let Some(e) = error {
        for key in ["status", "code", "type"] {
            if let Some(s) = e.get(key).and_then(Value::as_str) {
                tags.push(s.to_ascii_lowercase());
            }
        }
        if let Some(details) = e.get("details").and_then(Value::as_array) {
            tags.extend(
                details
                    .iter()
                    .filter_map(|d| d.get("reason").and_then(Value::as_str))
                    .map(str::to_ascii_lowercase),
            );
        }
    }
    let lower_message = message.to_ascii_lowercase();
    let signals = |needles: &[&str]| {
        needles
            .iter()
            .any(|n| tags.iter().any(|t| t.contains(n)) || lower_message.contains(n))
    };

    let kind = if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || signals(&[
            "api_key_invalid",
            "invalid_api_key",
            "unauthenticated",
            "api key not valid",
            "invalid api key",
        ]) {
        ProviderErrorKind::Unauthorized
    } else if status == StatusCode::TOO_MANY_REQUESTS
        || signals(&["resource_exhausted", "rate_limit", "insufficient_quota", "quota"])
    {
        ProviderErrorKind::QuotaExceeded
    } else if signals(&["content_filter", "safety", "prohibited_content", "blocked"]) {
        ProviderErrorKind::SafetyBlocked
    } else {
        ProviderErrorKind::Upstream
    };

    ProviderError::new(provider, kind, message).with_status(status)
}

/* ------------------------------------------------------------------------- */
/* Env helpers                                                               */
/* ------------------------------------------------------------------------- */

/// Returns the trimmed value of `name`, or `None` if unset or blank.
pub fn env_opt_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
///
/// # Errors
/// [`ConfigError::InvalidNumber`] if the variable is set but not a valid `u64`.
pub fn env_opt_u64<F>(lookup: &F, name: &'static str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_opt_var(lookup, name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
///
/// # Errors
/// [`ConfigError::InvalidBool`] for any other spelling.
pub fn env_opt_bool<F>(lookup: &F, name: &'static str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_opt_var(lookup, name).map(|v| v.to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidBool { var: name }.into()),
        },
    }
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// [`ConfigError::InvalidFormat`] when the string does not start with a valid
/// HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}
