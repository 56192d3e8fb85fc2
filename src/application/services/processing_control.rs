use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::application::ports::{
    DurableStore, DurableStoreError, ProcessingStateEvent, ProcessingStateListener,
};
use crate::domain::{
    ProcessingStateSnapshot, REASON_INITIAL, REASON_RESET, REASON_STARTED, REASON_STOPPED,
    StoragePath,
};

use super::ProcessingLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleResult {
    pub previous: bool,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub state_changed: bool,
    pub records_cleared: usize,
    pub store_cleared: bool,
    pub directory_recreated: bool,
}

impl ResetReport {
    pub fn success(&self) -> bool {
        self.store_cleared && self.directory_recreated
    }
}

#[derive(Debug)]
struct ChangeMetadata {
    at: DateTime<Utc>,
    reason: &'static str,
}

/// Process-wide on/off switch for document consumption.
///
/// Starts disabled. The flag only moves through compare-and-swap; after each
/// transition the registered listeners are told about the flag's current
/// value, one notification round at a time.
pub struct ProcessingControl {
    enabled: AtomicBool,
    metadata: RwLock<ChangeMetadata>,
    listeners: RwLock<Vec<Arc<dyn ProcessingStateListener>>>,
    notify_lock: tokio::sync::Mutex<()>,
    ledger: Arc<ProcessingLedger>,
    durable_store: Arc<dyn DurableStore>,
    output_dir: StoragePath,
}

impl ProcessingControl {
    pub fn new(
        ledger: Arc<ProcessingLedger>,
        durable_store: Arc<dyn DurableStore>,
        output_dir: StoragePath,
    ) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            metadata: RwLock::new(ChangeMetadata {
                at: Utc::now(),
                reason: REASON_INITIAL,
            }),
            listeners: RwLock::new(Vec::new()),
            notify_lock: tokio::sync::Mutex::new(()),
            ledger,
            durable_store,
            output_dir,
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn ProcessingStateListener>) {
        self.listeners.write().push(listener);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Returns whether the flag actually moved.
    pub async fn start(&self) -> bool {
        self.transition(true, REASON_STARTED).await
    }

    pub async fn stop(&self) -> bool {
        self.transition(false, REASON_STOPPED).await
    }

    pub async fn toggle(&self) -> ToggleResult {
        let previous = self.enabled.fetch_xor(true, Ordering::SeqCst);
        let current = !previous;
        self.record_change(current, if current { REASON_STARTED } else { REASON_STOPPED });
        tracing::info!(previous, current, "Processing toggled");
        self.notify_listeners().await;
        ToggleResult { previous, current }
    }

    /// Disables processing, forgets every record and dedup entry, and
    /// recreates the durable output directory.
    pub async fn reset(&self) -> ResetReport {
        let was_enabled = self.enabled.swap(false, Ordering::SeqCst);
        self.record_change(false, REASON_RESET);
        self.notify_listeners().await;

        let records_cleared = self.ledger.clear();

        let store_cleared = match self.durable_store.delete(&self.output_dir, true).await {
            Ok(()) | Err(DurableStoreError::NotFound(_)) => true,
            Err(e) => {
                tracing::error!(error = %e, path = %self.output_dir, "Failed to clear output directory");
                false
            }
        };

        let directory_recreated = match self.durable_store.mkdir(&self.output_dir).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, path = %self.output_dir, "Failed to recreate output directory");
                false
            }
        };

        tracing::info!(
            was_enabled,
            records_cleared,
            store_cleared,
            directory_recreated,
            "Processing state reset"
        );

        ResetReport {
            state_changed: true,
            records_cleared,
            store_cleared,
            directory_recreated,
        }
    }

    pub fn state(&self) -> ProcessingStateSnapshot {
        let metadata = self.metadata.read();
        ProcessingStateSnapshot {
            enabled: self.is_enabled(),
            last_changed: metadata.at,
            last_change_reason: metadata.reason.to_string(),
        }
    }

    async fn transition(&self, enabled: bool, reason: &'static str) -> bool {
        if self
            .enabled
            .compare_exchange(!enabled, enabled, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(enabled, "Processing state unchanged");
            return false;
        }

        self.record_change(enabled, reason);
        tracing::info!(enabled, reason, "Processing state changed");
        self.notify_listeners().await;
        true
    }

    fn record_change(&self, enabled: bool, reason: &'static str) {
        let mut metadata = self.metadata.write();
        // A later writer already moved the flag on; its reason wins.
        if self.enabled.load(Ordering::SeqCst) != enabled {
            return;
        }
        metadata.at = Utc::now();
        metadata.reason = reason;
    }

    /// Listeners receive the flag as it is when they run, so overlapping
    /// transitions settle on the final value.
    async fn notify_listeners(&self) {
        let _round = self.notify_lock.lock().await;
        let event = ProcessingStateEvent::from_enabled(self.is_enabled());
        let listeners: Vec<Arc<dyn ProcessingStateListener>> = self.listeners.read().clone();
        for listener in listeners {
            listener.on_state_changed(event).await;
        }
    }
}
