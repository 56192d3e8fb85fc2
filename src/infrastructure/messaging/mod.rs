mod binding_registry;
mod consumer_binding;
mod in_memory_broker;

pub use binding_registry::BindingRegistry;
pub use consumer_binding::{BindingConfig, ConsumerBinding, delivery_attempt};
pub use in_memory_broker::InMemoryBroker;
