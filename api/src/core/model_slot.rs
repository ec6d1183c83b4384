//! Process-wide, lazily initialized provider client.
//!
//! The first caller builds the client (probing candidates when asked to);
//! concurrent callers wait on the same initialization and then share the
//! resulting `Arc` without further locking. A failed probe is remembered as
//! [`ModelState::NoWorkingModel`] until the process restarts. Any other
//! construction error is not cached.

use std::sync::Arc;

use llm_provider::{AiLlmError, ProviderClient, ProviderSettings, build_client};
use tokio::sync::OnceCell;

use crate::error_handler::{AppError, AppResult};

/// What the slot settled on.
#[derive(Debug)]
pub enum ModelState {
    Ready(Arc<ProviderClient>),
    NoWorkingModel,
}

#[derive(Debug, Default)]
pub struct ModelSlot {
    cell: OnceCell<ModelState>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared client, building it on first use.
    ///
    /// # Errors
    /// - [`AppError::NoWorkingModel`] once a probe has failed
    /// - [`AppError::Provider`] if the client cannot be constructed
    pub async fn get_or_init(
        &self,
        settings: &ProviderSettings,
        api_key: &str,
        probe: bool,
    ) -> AppResult<Arc<ProviderClient>> {
        let state = self
            .cell
            .get_or_try_init(|| async {
                match build_client(settings, api_key, probe).await {
                    Ok(client) => Ok(ModelState::Ready(Arc::new(client))),
                    Err(AiLlmError::NoWorkingModel { .. }) => Ok(ModelState::NoWorkingModel),
                    Err(e) => Err(e),
                }
            })
            .await?;

        match state {
            ModelState::Ready(client) => Ok(Arc::clone(client)),
            ModelState::NoWorkingModel => Err(AppError::NoWorkingModel),
        }
    }

    /// The settled state, or `None` before the first successful initialization.
    pub fn current(&self) -> Option<&ModelState> {
        self.cell.get()
    }
}
