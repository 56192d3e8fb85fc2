use async_trait::async_trait;

use crate::domain::BindingState;

/// Start/stop control over a named consumption binding of the transport.
#[async_trait]
pub trait ConsumptionController: Send + Sync {
    async fn pause(&self, binding: &str) -> Result<(), ConsumptionError>;

    async fn resume(&self, binding: &str) -> Result<(), ConsumptionError>;

    async fn state(&self, binding: &str) -> Result<BindingState, ConsumptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConsumptionError {
    #[error("unknown binding: {0}")]
    UnknownBinding(String),
    #[error("binding {binding} rejected {action}: {reason}")]
    Rejected {
        binding: String,
        action: &'static str,
        reason: String,
    },
}
