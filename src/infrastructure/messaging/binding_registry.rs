use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::application::ports::{ConsumptionController, ConsumptionError};
use crate::domain::BindingState;

use super::ConsumerBinding;

/// Looks bindings up by name for the consumption controller.
#[derive(Default)]
pub struct BindingRegistry {
    bindings: DashMap<String, Arc<ConsumerBinding>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, binding: Arc<ConsumerBinding>) {
        self.bindings.insert(binding.name().to_string(), binding);
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConsumerBinding>> {
        self.bindings.get(name).map(|b| Arc::clone(b.value()))
    }

    pub fn shutdown_all(&self) {
        for binding in self.bindings.iter() {
            binding.shutdown();
        }
    }

    fn lookup(&self, name: &str) -> Result<Arc<ConsumerBinding>, ConsumptionError> {
        self.get(name)
            .ok_or_else(|| ConsumptionError::UnknownBinding(name.to_string()))
    }
}

#[async_trait]
impl ConsumptionController for BindingRegistry {
    async fn pause(&self, binding: &str) -> Result<(), ConsumptionError> {
        if self.lookup(binding)?.pause() {
            Ok(())
        } else {
            Err(rejected(binding, "pause"))
        }
    }

    async fn resume(&self, binding: &str) -> Result<(), ConsumptionError> {
        if self.lookup(binding)?.resume() {
            Ok(())
        } else {
            Err(rejected(binding, "resume"))
        }
    }

    async fn state(&self, binding: &str) -> Result<BindingState, ConsumptionError> {
        Ok(self.lookup(binding)?.state())
    }
}

fn rejected(binding: &str, action: &'static str) -> ConsumptionError {
    ConsumptionError::Rejected {
        binding: binding.to_string(),
        action,
        reason: "binding is shut down".to_string(),
    }
}
