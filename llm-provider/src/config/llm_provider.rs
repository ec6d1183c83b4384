use std::{fmt, str::FromStr};

use crate::error_handler::ConfigError;

/// The upstream model provider the relay forwards questions to.
///
/// Exactly one provider is active per process; the choice is made at startup
/// (`RELAY_PROVIDER`) and never changes afterwards.
///
/// # Examples
///
/// ```
/// use llm_provider::config::llm_provider::LlmProvider;
///
/// let provider: LlmProvider = "gemini".parse().unwrap();
/// assert_eq!(provider.api_key_var(), "GEMINI_API_KEY");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// Groq, spoken to through its OpenAI-compatible chat completions API.
    Groq,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Groq => "GROQ_API_KEY",
        }
    }

    /// Public base URL of the provider API.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::Groq => "https://api.groq.com/openai",
        }
    }

    /// Candidate model identifiers, in probe order.
    pub fn default_models(self) -> &'static [&'static str] {
        match self {
            LlmProvider::Gemini => &["gemini-2.5-flash", "gemini-2.0-flash", "gemini-1.5-flash"],
            LlmProvider::Groq => &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"],
        }
    }

    /// Human-readable name used in banners and logs.
    pub fn display_name(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "Gemini",
            LlmProvider::Groq => "Groq",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "groq" => Ok(LlmProvider::Groq),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
