use async_trait::async_trait;

/// Transition of the processing control flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStateEvent {
    Started,
    Stopped,
}

impl ProcessingStateEvent {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Started } else { Self::Stopped }
    }
}

#[async_trait]
pub trait ProcessingStateListener: Send + Sync {
    async fn on_state_changed(&self, event: ProcessingStateEvent);
}
