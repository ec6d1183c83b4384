//! OpenAI-compatible chat completions client, used for Groq.
//!
//! Minimal, non-streaming client. The endpoint is derived from
//! `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions: chat completion (non-streaming)
//!
//! For Groq the base is `https://api.groq.com/openai`.
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::Groq`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Failures are classified via [`classify_http_failure`].

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind, classify_http_failure, make_snippet},
    prompt::ComposedPrompt,
};

/// Thin client for an OpenAI-compatible chat API.
///
/// Keeps a preconfigured `reqwest::Client` (default headers, optional
/// timeout). Holds no per-request state and is safe to share.
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidConfig` for a wrong provider,
    ///   a missing API key, or an invalid endpoint
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Groq {
            return Err(ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidConfig,
                "chat completions client only serves Groq",
            )
            .into());
        }

        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ProviderError::new(cfg.provider, ProviderErrorKind::InvalidConfig, "missing API key")
        })?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidConfig,
                format!("invalid endpoint: {}", cfg.endpoint),
            )
            .into());
        }

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidConfig,
                format!("invalid API key header: {e}"),
            )
        })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let url_chat = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = ?cfg.timeout_secs,
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Model identifier this client is bound to.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Performs a **non-streaming** chat completion and returns the message
    /// content verbatim.
    ///
    /// The request carries the system prompt as a `system` message (omitted
    /// when empty) followed by the question as a `user` message.
    ///
    /// # Errors
    /// [`AiLlmError::Provider`] with a kind assigned by
    /// [`classify_http_failure`] for non-2xx responses, `SafetyBlocked` for a
    /// `content_filter` finish, `Transport`/`Decode` for client failures and
    /// `EmptyResponse` when no choice carries content.
    pub async fn generate(&self, prompt: &ComposedPrompt) -> Result<String, AiLlmError> {
        let provider = self.cfg.provider;
        let started = Instant::now();
        let body = ChatCompletionRequest::from_prompt(&self.cfg.model, prompt);

        debug!(
            model = %self.cfg.model,
            question_len = prompt.question().len(),
            has_system = !prompt.system().is_empty(),
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(provider, &e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let err = classify_http_failure(provider, status, &text);

            error!(
                %status,
                url = %self.url_chat,
                snippet = %make_snippet(&text),
                kind = %err.kind,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completions returned non-success status"
            );

            return Err(err.into());
        }

        let out: ChatCompletionResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode chat completions response"
            );
            ProviderError::new(
                provider,
                ProviderErrorKind::Decode,
                format!("{e}; expected `choices[0].message.content`"),
            )
        })?;

        let first = out.choices.into_iter().next().ok_or_else(|| {
            ProviderError::new(provider, ProviderErrorKind::EmptyResponse, "no choices returned")
        })?;

        if first.finish_reason.as_deref() == Some("content_filter") {
            return Err(ProviderError::new(
                provider,
                ProviderErrorKind::SafetyBlocked,
                "completion stopped by content filter",
            )
            .into());
        }

        let content = first.message.content.ok_or_else(|| {
            ProviderError::new(provider, ProviderErrorKind::EmptyResponse, "choice without content")
        })?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            answer_len = content.len(),
            "chat completion completed"
        );

        Ok(content)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Minimal request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_prompt(model: &'a str, prompt: &'a ComposedPrompt) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system().is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: prompt.system(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.question(),
        });

        Self { model, messages }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
