//! Builds the process-wide provider client, optionally probing candidates.
//!
//! The probe walks [`ProviderSettings::candidates`] in order, sends
//! [`ComposedPrompt::probe`] to each, and keeps the first model that answers.
//! It runs once; there is no retry loop and no re-probe later.

use std::time::Instant;

use tracing::{info, warn};

use crate::{
    config::default_config::ProviderSettings, error_handler::AiLlmError, prompt::ComposedPrompt,
    provider_client::ProviderClient,
};

/// Builds a client for the primary candidate without any network call.
///
/// # Errors
/// Propagates [`ProviderClient::new`] errors.
pub fn connect(settings: &ProviderSettings, api_key: &str) -> Result<ProviderClient, AiLlmError> {
    ProviderClient::new(settings.model_config(settings.primary_model(), api_key))
}

/// Probes candidates in order and returns a client for the first one that
/// answers. Each attempt is logged with its latency.
///
/// # Errors
/// [`AiLlmError::NoWorkingModel`] when every candidate fails.
pub async fn probe_candidates(
    settings: &ProviderSettings,
    api_key: &str,
) -> Result<ProviderClient, AiLlmError> {
    let probe = ComposedPrompt::probe();

    for model in &settings.candidates {
        let started = Instant::now();
        let outcome = match ProviderClient::new(settings.model_config(model, api_key)) {
            Ok(client) => client.generate(&probe).await.map(|_| client),
            Err(e) => Err(e),
        };
        let latency_ms = started.elapsed().as_millis();

        match outcome {
            Ok(client) => {
                info!(
                    provider = %settings.provider,
                    model = %model,
                    latency_ms,
                    "model probe succeeded"
                );
                return Ok(client);
            }
            Err(err) => warn!(
                provider = %settings.provider,
                model = %model,
                latency_ms,
                error = %err,
                "model probe failed"
            ),
        }
    }

    Err(AiLlmError::NoWorkingModel {
        provider: settings.provider,
        tried: settings.candidates.clone(),
    })
}

/// [`probe_candidates`] when `probe` is set, otherwise [`connect`].
pub async fn build_client(
    settings: &ProviderSettings,
    api_key: &str,
    probe: bool,
) -> Result<ProviderClient, AiLlmError> {
    if probe {
        probe_candidates(settings, api_key).await
    } else {
        connect(settings, api_key)
    }
}
