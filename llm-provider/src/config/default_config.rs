//! Provider settings loaded from environment variables.
//!
//! One [`ProviderSettings`] value describes the whole upstream side of the
//! relay: which provider is active, where it lives, which models to try, and
//! the credential (if any) found at startup.
//!
//! # Environment variables
//!
//! - `RELAY_PROVIDER`              = `gemini` | `groq` (default `groq`)
//! - `RELAY_PROVIDER_ENDPOINT`     = base URL override (default: provider's public API)
//! - `RELAY_MODEL_CANDIDATES`      = comma-separated model ids, in probe order
//! - `RELAY_PROBE_MODELS`          = `true` | `false` (default `true`)
//! - `RELAY_PROVIDER_TIMEOUT_SECS` = optional client timeout (u64)
//! - `GEMINI_API_KEY` / `GROQ_API_KEY` = credential for the selected provider
//!
//! The credential is optional here: a relay without a key still starts and
//! answers `/ask` with a configuration error.

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt_bool, env_opt_u64, env_opt_var, validate_http_endpoint},
};

/// Provider used when `RELAY_PROVIDER` is unset.
pub const DEFAULT_PROVIDER: LlmProvider = LlmProvider::Groq;

/// Upstream settings shared by every deployment shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Active provider.
    pub provider: LlmProvider,
    /// API base URL.
    pub endpoint: String,
    /// Model identifiers in probe order; never empty.
    pub candidates: Vec<String>,
    /// Credential read at startup; `None` when the variable is unset or blank.
    pub api_key: Option<String>,
    /// Optional client timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Whether the long-running server probes candidates before serving.
    pub probe_models: bool,
}

impl ProviderSettings {
    /// Defaults for `provider`: public endpoint, built-in candidates, no key.
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            endpoint: provider.default_endpoint().to_string(),
            candidates: provider
                .default_models()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            api_key: None,
            timeout_secs: None,
            probe_models: true,
        }
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    ///
    /// # Errors
    /// - [`ConfigError::UnsupportedProvider`] for an unknown `RELAY_PROVIDER`
    /// - [`ConfigError::InvalidFormat`] for a non-http(s) endpoint
    /// - [`ConfigError::InvalidNumber`] / [`ConfigError::InvalidBool`] for bad values
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AiLlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match env_opt_var(&lookup, "RELAY_PROVIDER") {
            Some(name) => name.parse::<LlmProvider>()?,
            None => DEFAULT_PROVIDER,
        };

        let mut settings = Self::new(provider);

        if let Some(endpoint) = env_opt_var(&lookup, "RELAY_PROVIDER_ENDPOINT") {
            validate_http_endpoint("RELAY_PROVIDER_ENDPOINT", &endpoint)?;
            settings.endpoint = endpoint.trim_end_matches('/').to_string();
        }

        if let Some(list) = env_opt_var(&lookup, "RELAY_MODEL_CANDIDATES") {
            let candidates = parse_candidates(&list);
            if candidates.is_empty() {
                return Err(ConfigError::EmptyModel.into());
            }
            settings.candidates = candidates;
        }

        if let Some(probe) = env_opt_bool(&lookup, "RELAY_PROBE_MODELS")? {
            settings.probe_models = probe;
        }

        settings.timeout_secs = env_opt_u64(&lookup, "RELAY_PROVIDER_TIMEOUT_SECS")?;
        settings.api_key = env_opt_var(&lookup, provider.api_key_var());

        Ok(settings)
    }

    /// Replaces the credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Replaces the API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the candidate list. An empty list keeps the current one.
    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = candidates.into_iter().map(Into::into).collect();
        if !list.is_empty() {
            self.candidates = list;
        }
        self
    }

    /// Enables or disables the startup probe.
    pub fn with_probe(mut self, probe_models: bool) -> Self {
        self.probe_models = probe_models;
        self
    }

    /// The first candidate; used directly when probing is disabled.
    pub fn primary_model(&self) -> &str {
        self.candidates
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.provider.default_models()[0])
    }

    /// Client config for one `model` using `api_key`.
    pub fn model_config(&self, model: &str, api_key: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: self.provider,
            model: model.to_string(),
            endpoint: self.endpoint.clone(),
            api_key: Some(api_key.to_string()),
            timeout_secs: self.timeout_secs,
        }
    }
}

fn parse_candidates(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
