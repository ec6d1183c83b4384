//! Enum dispatch over the provider clients.
//!
//! One [`ProviderClient`] is built per process and then shared behind an
//! `Arc`; every method takes `&self` and no request state is kept, so
//! concurrent calls need no locking.

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    prompt::ComposedPrompt,
    services::{gemini_service::GeminiService, open_ai_service::OpenAiService},
};

/// Handle to the active provider, bound to one model.
#[derive(Debug)]
pub enum ProviderClient {
    Gemini(GeminiService),
    Groq(OpenAiService),
}

impl ProviderClient {
    /// Builds the client matching `cfg.provider`.
    ///
    /// # Errors
    /// Propagates the constructor errors of the underlying service.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        match cfg.provider {
            LlmProvider::Gemini => GeminiService::new(cfg).map(ProviderClient::Gemini),
            LlmProvider::Groq => OpenAiService::new(cfg).map(ProviderClient::Groq),
        }
    }

    pub fn provider(&self) -> LlmProvider {
        match self {
            ProviderClient::Gemini(_) => LlmProvider::Gemini,
            ProviderClient::Groq(_) => LlmProvider::Groq,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderClient::Gemini(svc) => svc.model(),
            ProviderClient::Groq(svc) => svc.model(),
        }
    }

    /// One non-streaming generation call; the answer is returned unmodified.
    pub async fn generate(&self, prompt: &ComposedPrompt) -> Result<String, AiLlmError> {
        match self {
            ProviderClient::Gemini(svc) => svc.generate(prompt).await,
            ProviderClient::Groq(svc) => svc.generate(prompt).await,
        }
    }
}
