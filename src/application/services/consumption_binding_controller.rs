use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::application::ports::{
    ConsumptionController, ProcessingStateEvent, ProcessingStateListener,
};

use super::ProcessingControl;

const UNKNOWN_STATUS: &str = "unknown";

/// Drives one transport binding from processing state transitions.
///
/// Transport errors are logged and swallowed; the control state stays the
/// source of truth and operators can retry.
pub struct ConsumptionBindingController {
    controller: Arc<dyn ConsumptionController>,
    binding: String,
}

impl ConsumptionBindingController {
    pub fn new(controller: Arc<dyn ConsumptionController>, binding: impl Into<String>) -> Self {
        Self {
            controller,
            binding: binding.into(),
        }
    }

    pub fn binding(&self) -> &str {
        &self.binding
    }

    pub async fn resume(&self) -> bool {
        match self.controller.resume(&self.binding).await {
            Ok(()) => {
                tracing::info!(binding = %self.binding, "Consumption resumed");
                true
            }
            Err(e) => {
                tracing::error!(binding = %self.binding, error = %e, "Failed to resume consumption");
                false
            }
        }
    }

    pub async fn pause(&self) -> bool {
        match self.controller.pause(&self.binding).await {
            Ok(()) => {
                tracing::info!(binding = %self.binding, "Consumption paused");
                true
            }
            Err(e) => {
                tracing::error!(binding = %self.binding, error = %e, "Failed to pause consumption");
                false
            }
        }
    }

    /// `false` when the binding cannot be queried.
    pub async fn is_running(&self) -> bool {
        self.controller
            .state(&self.binding)
            .await
            .map(|state| state.is_running())
            .unwrap_or(false)
    }

    /// Raw binding state, or `"unknown"` when the binding cannot be queried.
    pub async fn status(&self) -> String {
        match self.controller.state(&self.binding).await {
            Ok(state) => state.as_str().to_string(),
            Err(e) => {
                tracing::warn!(binding = %self.binding, error = %e, "Failed to query binding state");
                UNKNOWN_STATUS.to_string()
            }
        }
    }

    /// After `delay`, brings the binding in line with `control`, which
    /// pauses it unless an operator already started processing. Transports
    /// that auto-start their consumers are stopped here.
    pub fn spawn_startup_guard(
        self: &Arc<Self>,
        control: Arc<ProcessingControl>,
        delay: Duration,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if control.is_enabled() {
                tracing::info!(binding = %this.binding, "Processing enabled during startup; leaving binding running");
                this.resume().await;
            } else {
                tracing::info!(binding = %this.binding, "Forcing binding to stopped state after startup");
                this.pause().await;
            }
        })
    }
}

#[async_trait]
impl ProcessingStateListener for ConsumptionBindingController {
    async fn on_state_changed(&self, event: ProcessingStateEvent) {
        match event {
            ProcessingStateEvent::Started => {
                self.resume().await;
            }
            ProcessingStateEvent::Stopped => {
                self.pause().await;
            }
        }
    }
}
