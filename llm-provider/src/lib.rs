//! Upstream side of the code relay.
//!
//! - [`config`]: provider selection and settings from the environment
//! - [`prompt`]: fixed system prompts and prompt composition
//! - [`services`]: Gemini and OpenAI-compatible (Groq) clients
//! - [`provider_client`]: enum dispatch over the clients
//! - [`client_factory`]: one-shot client construction and model probing
//! - [`error_handler`]: unified errors and failure classification
//! - [`telemetry`]: library-scoped tracing layer

pub mod client_factory;
pub mod config;
pub mod error_handler;
pub mod prompt;
pub mod provider_client;
pub mod services;
pub mod telemetry;

pub use client_factory::{build_client, connect, probe_candidates};
pub use config::{default_config::ProviderSettings, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ProviderError, ProviderErrorKind};
pub use prompt::ComposedPrompt;
pub use provider_client::ProviderClient;
