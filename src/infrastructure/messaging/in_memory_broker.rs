use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::application::ports::{
    MessagePublisher, QueueInspector, TransportError, TransportMessage,
};

#[derive(Default)]
struct Destination {
    queue: Mutex<VecDeque<TransportMessage>>,
    available: Notify,
}

impl Destination {
    fn push(&self, message: TransportMessage) {
        self.queue.lock().push_back(message);
        self.available.notify_one();
    }

    /// Waits for a message. A message is only removed from the queue inside
    /// a completed poll, so dropping this future never loses one.
    async fn receive(&self) -> TransportMessage {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(message) = self.queue.lock().pop_front() {
                return message;
            }

            notified.await;
        }
    }
}

/// Named FIFO destinations held in process memory.
///
/// Each message is delivered to exactly one receiver. Messages nobody takes
/// stay queued and count towards [`QueueInspector::depth`].
#[derive(Default)]
pub struct InMemoryBroker {
    destinations: DashMap<String, Arc<Destination>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn destination(&self, name: &str) -> Arc<Destination> {
        if let Some(existing) = self.destinations.get(name) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.destinations
                .entry(name.to_string())
                .or_default()
                .value(),
        )
    }

    /// Creates `name` if it does not exist yet.
    pub fn declare(&self, name: &str) {
        self.destination(name);
    }

    pub async fn receive(&self, name: &str) -> TransportMessage {
        self.destination(name).receive().await
    }

    /// Puts a message back at the tail of `name`.
    pub fn requeue(&self, name: &str, message: TransportMessage) {
        tracing::trace!(destination = name, "Requeueing message");
        self.destination(name).push(message);
    }

    pub fn try_receive(&self, name: &str) -> Option<TransportMessage> {
        self.destination(name).queue.lock().pop_front()
    }

    /// Removes and returns everything currently queued on `name`.
    pub fn drain(&self, name: &str) -> Vec<TransportMessage> {
        self.destination(name).queue.lock().drain(..).collect()
    }

    pub fn queued(&self, name: &str) -> usize {
        self.destinations
            .get(name)
            .map(|d| d.queue.lock().len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl MessagePublisher for InMemoryBroker {
    async fn publish(
        &self,
        destination: &str,
        message: TransportMessage,
    ) -> Result<(), TransportError> {
        tracing::trace!(destination, "Publishing message");
        self.destination(destination).push(message);
        Ok(())
    }
}

#[async_trait]
impl QueueInspector for InMemoryBroker {
    async fn depth(&self, destination: &str) -> Result<usize, TransportError> {
        self.destinations
            .get(destination)
            .map(|d| d.queue.lock().len())
            .ok_or_else(|| TransportError::UnknownDestination(destination.to_string()))
    }
}
