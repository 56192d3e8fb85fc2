use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::ports::{
    Disposition, HEADER_DELIVERY_ATTEMPT, MessageHandler, TransportMessage,
};
use crate::domain::BindingState;
use crate::presentation::config::MessagingSettings;

use super::InMemoryBroker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Running,
    Paused,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct BindingConfig {
    pub name: String,
    pub destination: String,
    pub group: String,
    pub concurrency: usize,
    /// Start consuming as soon as workers are spawned.
    pub auto_startup: bool,
    /// Deliveries per message, the first included, before a requeue request
    /// is dropped.
    pub max_delivery_attempts: u32,
    pub redelivery_delay: Duration,
}

impl BindingConfig {
    /// Paused, single worker, three deliveries and no redelivery delay.
    pub fn new(name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination: destination.into(),
            group: "docstream".to_string(),
            concurrency: 1,
            auto_startup: false,
            max_delivery_attempts: 3,
            redelivery_delay: Duration::ZERO,
        }
    }

    /// The binding only starts running when the settings ask for it and
    /// processing is already enabled.
    pub fn from_settings(settings: &MessagingSettings, processing_enabled: bool) -> Self {
        Self {
            name: settings.binding_name.clone(),
            destination: settings.input_destination.clone(),
            group: settings.consumer_group.clone(),
            concurrency: settings.concurrency,
            auto_startup: settings.auto_startup && processing_enabled,
            max_delivery_attempts: settings.max_delivery_attempts,
            redelivery_delay: Duration::from_millis(settings.redelivery_delay_ms),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_auto_startup(mut self, auto_startup: bool) -> Self {
        self.auto_startup = auto_startup;
        self
    }

    pub fn with_redelivery(mut self, max_delivery_attempts: u32, delay: Duration) -> Self {
        self.max_delivery_attempts = max_delivery_attempts;
        self.redelivery_delay = delay;
        self
    }
}

/// A named group of workers consuming one destination.
///
/// While paused, workers stop taking messages; anything published stays on
/// the destination. A message already taken is always handled to completion.
/// A handler asking for a requeue gets the message back on the destination
/// until its delivery attempts run out.
pub struct ConsumerBinding {
    config: BindingConfig,
    broker: Arc<InMemoryBroker>,
    handler: Arc<dyn MessageHandler>,
    lifecycle: watch::Sender<Lifecycle>,
    in_flight: AtomicUsize,
}

impl ConsumerBinding {
    pub fn new(
        mut config: BindingConfig,
        broker: Arc<InMemoryBroker>,
        handler: Arc<dyn MessageHandler>,
    ) -> Arc<Self> {
        let initial = if config.auto_startup {
            Lifecycle::Running
        } else {
            Lifecycle::Paused
        };
        config.concurrency = config.concurrency.max(1);
        config.max_delivery_attempts = config.max_delivery_attempts.max(1);
        broker.declare(&config.destination);

        Arc::new(Self {
            config,
            broker,
            handler,
            lifecycle: watch::Sender::new(initial),
            in_flight: AtomicUsize::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn destination(&self) -> &str {
        &self.config.destination
    }

    /// Spawns the worker tasks.
    pub fn spawn_workers(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        tracing::info!(
            binding = %self.config.name,
            destination = %self.config.destination,
            group = %self.config.group,
            concurrency = self.config.concurrency,
            state = %self.state(),
            "Starting consumer binding"
        );
        (0..self.config.concurrency)
            .map(|worker| tokio::spawn(Arc::clone(self).worker_loop(worker)))
            .collect()
    }

    /// Returns `false` once the binding has been shut down.
    pub fn pause(&self) -> bool {
        self.set(Lifecycle::Paused)
    }

    pub fn resume(&self) -> bool {
        self.set(Lifecycle::Running)
    }

    pub fn shutdown(&self) {
        self.lifecycle.send_replace(Lifecycle::Shutdown);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.lifecycle.borrow() == Lifecycle::Shutdown
    }

    pub fn state(&self) -> BindingState {
        match *self.lifecycle.borrow() {
            Lifecycle::Running => BindingState::Running,
            Lifecycle::Paused | Lifecycle::Shutdown => BindingState::Paused,
        }
    }

    /// Messages taken from the destination and still being handled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn set(&self, next: Lifecycle) -> bool {
        self.lifecycle.send_if_modified(|current| {
            if *current == Lifecycle::Shutdown || *current == next {
                return false;
            }
            *current = next;
            true
        });
        !self.is_shut_down()
    }

    async fn worker_loop(self: Arc<Self>, worker: usize) {
        let mut lifecycle = self.lifecycle.subscribe();
        tracing::debug!(binding = %self.config.name, worker, "Consumer worker started");

        loop {
            let state = match lifecycle.wait_for(|s| *s != Lifecycle::Paused).await {
                Ok(state) => *state,
                Err(_) => break,
            };
            if state == Lifecycle::Shutdown {
                break;
            }

            tokio::select! {
                biased;
                changed = lifecycle.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                message = self.broker.receive(&self.config.destination) => {
                    self.in_flight.fetch_add(1, Ordering::SeqCst);
                    let disposition = self.handler.handle(&message).await;
                    if disposition == Disposition::Requeue {
                        self.redeliver(message);
                    }
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            }
        }

        tracing::debug!(binding = %self.config.name, worker, "Consumer worker stopped");
    }

    fn redeliver(&self, message: TransportMessage) {
        let attempt = delivery_attempt(&message);
        if attempt >= self.config.max_delivery_attempts {
            tracing::warn!(
                binding = %self.config.name,
                attempt,
                "Delivery attempts exhausted, dropping message"
            );
            return;
        }

        let message = message.with_header(HEADER_DELIVERY_ATTEMPT, attempt + 1);
        tracing::info!(binding = %self.config.name, attempt = attempt + 1, "Requeueing message");

        let delay = self.config.redelivery_delay;
        if delay.is_zero() {
            self.broker.requeue(&self.config.destination, message);
            return;
        }

        let broker = Arc::clone(&self.broker);
        let destination = self.config.destination.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            broker.requeue(&destination, message);
        });
    }
}

/// Deliveries so far, counting the one being handled.
pub fn delivery_attempt(message: &TransportMessage) -> u32 {
    message
        .header(HEADER_DELIVERY_ATTEMPT)
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}
