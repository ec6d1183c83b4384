use std::sync::Arc;

use llm_provider::{ProviderClient, ProviderSettings};
use tracing::{info, warn};

use crate::{
    core::model_slot::{ModelSlot, ModelState},
    error_handler::{AppError, AppResult},
};

/// Shared state for all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Upstream settings, including the credential read at startup.
    pub settings: ProviderSettings,
    /// Probe candidates when the client is first built.
    pub probe_on_init: bool,
    /// The one provider client of this process.
    pub model: ModelSlot,
}

impl AppState {
    /// State for the long-running server; probing follows `settings.probe_models`.
    pub fn new(settings: ProviderSettings) -> Self {
        let probe_on_init = settings.probe_models;
        Self {
            settings,
            probe_on_init,
            model: ModelSlot::new(),
        }
    }

    /// State for the serverless handler: the client is built on first call
    /// without probing.
    pub fn for_function(settings: ProviderSettings) -> Self {
        Self {
            settings,
            probe_on_init: false,
            model: ModelSlot::new(),
        }
    }

    /// Load shared state from environment variables.
    pub fn from_env() -> AppResult<Self> {
        let settings = ProviderSettings::from_env().map_err(AppError::Config)?;
        Ok(Self::new(settings))
    }

    /// Credential gate: the API key, or a configuration error naming the
    /// missing variable.
    pub fn api_key(&self) -> AppResult<&str> {
        self.settings
            .api_key
            .as_deref()
            .ok_or(AppError::MissingApiKey(self.settings.provider.api_key_var()))
    }

    /// The shared provider client, built on first use.
    pub async fn client(&self) -> AppResult<Arc<ProviderClient>> {
        let api_key = self.api_key()?;
        self.model
            .get_or_init(&self.settings, api_key, self.probe_on_init)
            .await
    }

    /// Builds the client ahead of the first request when a key is present.
    ///
    /// Never fails: a missing key, a failed probe, or a construction error is
    /// logged and left for requests to report.
    pub async fn warm_up(&self) {
        let provider = self.settings.provider;
        if self.settings.api_key.is_none() {
            warn!(
                %provider,
                var = provider.api_key_var(),
                "API key environment variable not set; /ask will fail until it is configured"
            );
            return;
        }

        match self.client().await {
            Ok(client) => info!(
                %provider,
                model = client.model(),
                probed = self.probe_on_init,
                "provider client ready"
            ),
            Err(AppError::NoWorkingModel) => warn!(
                %provider,
                candidates = ?self.settings.candidates,
                "no working model found; every /ask will fail until restart"
            ),
            Err(e) => warn!(%provider, error = %e, "provider client not ready"),
        }
    }

    /// Model identifier once the client is built.
    pub fn active_model(&self) -> Option<&str> {
        match self.model.current() {
            Some(ModelState::Ready(client)) => Some(client.model()),
            _ => None,
        }
    }

    pub fn no_working_model(&self) -> bool {
        matches!(self.model.current(), Some(ModelState::NoWorkingModel))
    }
}
