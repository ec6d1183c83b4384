//! Gemini `generateContent` client.
//!
//! - POST {endpoint}/v1beta/models/{model}:generateContent
//!
//! The API key travels in the `x-goog-api-key` header so it never shows up in
//! logged URLs. The composed prompt is sent as a single text part.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind, classify_http_failure, make_snippet},
    prompt::ComposedPrompt,
};

/// Finish reasons that mean the answer was withheld by safety filtering.
const SAFETY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "IMAGE_SAFETY",
];

/// Thin client for the Gemini REST API.
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidConfig` for a wrong provider,
    ///   a missing API key, or an invalid endpoint
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Gemini {
            return Err(ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidConfig,
                "generateContent client only serves Gemini",
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
        let mut key = header::HeaderValue::from_str(&api_key).map_err(|e| {
            ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidConfig,
                format!("invalid API key header: {e}"),
            )
        })?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let url_generate = format!(
            "{}/v1beta/models/{}:generateContent",
            endpoint.trim_end_matches('/'),
            cfg.model
        );

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = ?cfg.timeout_secs,
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// Model identifier this client is bound to.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Sends the composed prompt and returns the concatenated text parts of
    /// the first candidate, unmodified.
    ///
    /// # Errors
    /// [`AiLlmError::Provider`] with a kind assigned by
    /// [`classify_http_failure`] for non-2xx responses, `SafetyBlocked` when
    /// the prompt or candidate was blocked, `Transport`/`Decode` for client
    /// failures and `EmptyResponse` when no text came back.
    pub async fn generate(&self, prompt: &ComposedPrompt) -> Result<String, AiLlmError> {
        let provider = self.cfg.provider;
        let started = Instant::now();
        let text = prompt.text();
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: &text }],
            }],
        };

        debug!(
            model = %self.cfg.model,
            prompt_len = text.len(),
            "POST {}", self.url_generate
        );

        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(provider, &e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let raw = resp.text().await.unwrap_or_default();
            let err = classify_http_failure(provider, status, &raw);

            error!(
                %status,
                url = %self.url_generate,
                snippet = %make_snippet(&raw),
                kind = %err.kind,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "generateContent returned non-success status"
            );

            return Err(err.into());
        }

        let out: GenerateContentResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode generateContent response"
            );
            ProviderError::new(
                provider,
                ProviderErrorKind::Decode,
                format!("{e}; expected `candidates[0].content.parts`"),
            )
        })?;

        let answer = extract_text(provider, out)?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            answer_len = answer.len(),
            "generateContent completed"
        );

        Ok(answer)
    }
}

/// Pulls the answer out of a decoded response, surfacing safety blocks.
fn extract_text(provider: LlmProvider, out: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = out.prompt_feedback.and_then(|f| f.block_reason) {
        warn!(%reason, "prompt blocked by Gemini");
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::SafetyBlocked,
            format!("prompt blocked: {reason}"),
        ));
    }

    let candidate = out.candidates.into_iter().next().ok_or_else(|| {
        ProviderError::new(provider, ProviderErrorKind::EmptyResponse, "no candidates returned")
    })?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if SAFETY_FINISH_REASONS.contains(&reason) {
            warn!(%reason, "candidate blocked by Gemini");
            return Err(ProviderError::new(
                provider,
                ProviderErrorKind::SafetyBlocked,
                format!("candidate blocked: {reason}"),
            ));
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.iter().all(|p| p.text.is_none()) {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::EmptyResponse,
            "candidate without text parts",
        ));
    }

    Ok(parts.into_iter().filter_map(|p| p.text).collect())
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn joins_text_parts_verbatim() {
        let out = decode(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"class A {\n"},{"text":"}\n"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(LlmProvider::Gemini, out).unwrap(), "class A {\n}\n");
    }

    #[test]
    fn blocked_prompt_is_a_safety_error() {
        let out = decode(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = extract_text(LlmProvider::Gemini, out).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::SafetyBlocked);
    }

    #[test]
    fn safety_finish_reason_is_a_safety_error() {
        let out = decode(r#"{"candidates":[{"finishReason":"PROHIBITED_CONTENT"}]}"#);
        let err = extract_text(LlmProvider::Gemini, out).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::SafetyBlocked);
    }

    #[test]
    fn no_candidates_is_empty() {
        let err = extract_text(LlmProvider::Gemini, decode("{}")).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::EmptyResponse);
    }

    #[test]
    fn request_carries_single_text_part() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: "SYS\n\nUser request: q" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "SYS\n\nUser request: q" }] }]
            })
        );
    }
}
