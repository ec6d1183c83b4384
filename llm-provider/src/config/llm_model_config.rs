use crate::config::llm_provider::LlmProvider;

/// Configuration for a single provider client bound to one model.
///
/// Built by [`ProviderSettings::model_config`](crate::config::default_config::ProviderSettings::model_config)
/// once a model identifier has been chosen (either the first candidate or the
/// winner of the startup probe).
///
/// # Fields
///
/// - `provider`: which upstream API to talk to.
/// - `model`: model identifier (e.g., `"gemini-2.5-flash"`).
/// - `endpoint`: API base URL without a trailing path.
/// - `api_key`: credential; required by both providers.
/// - `timeout_secs`: optional request timeout; `None` keeps the client default
///   (no timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmModelConfig {
    /// The upstream provider.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Base URL of the provider API.
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: Option<String>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
