use std::collections::BTreeMap;

use async_trait::async_trait;

pub const HEADER_CHUNK_INDEX: &str = "chunkIndex";
pub const HEADER_TOTAL_CHUNKS: &str = "totalChunks";
pub const HEADER_DOCUMENT_KEY: &str = "documentKey";
/// 1-based count of deliveries of an inbound message; absent on the first.
pub const HEADER_DELIVERY_ATTEMPT: &str = "deliveryAttempt";

/// Payload plus transport headers, as carried by a destination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportMessage {
    pub payload: String,
    pub headers: BTreeMap<String, String>,
}

impl TransportMessage {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(
        &self,
        destination: &str,
        message: TransportMessage,
    ) -> Result<(), TransportError>;
}

#[async_trait]
pub trait QueueInspector: Send + Sync {
    /// Messages waiting in `destination` that no consumer has taken yet.
    async fn depth(&self, destination: &str) -> Result<usize, TransportError>;
}

/// What the binding does with a message once its handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    /// Put the message back on its destination for another attempt.
    Requeue,
}

/// Receives messages from a consumption binding.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &TransportMessage) -> Disposition;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("unknown destination: {0}")]
    UnknownDestination(String),
    #[error("destination closed: {0}")]
    Closed(String),
    #[error("publish failed: {0}")]
    PublishFailed(String),
}
