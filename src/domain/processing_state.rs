use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const REASON_INITIAL: &str = "initial state";
pub const REASON_STARTED: &str = "started via API";
pub const REASON_STOPPED: &str = "stopped via API";
pub const REASON_RESET: &str = "reset via API";

/// Point-in-time copy of the processing control flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingStateSnapshot {
    pub enabled: bool,
    pub last_changed: DateTime<Utc>,
    pub last_change_reason: String,
}

impl ProcessingStateSnapshot {
    pub fn status(&self) -> ProcessingStatusLabel {
        ProcessingStatusLabel::from_enabled(self.enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessingStatusLabel {
    Started,
    Stopped,
}

impl ProcessingStatusLabel {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Started } else { Self::Stopped }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsumerStatus {
    Consuming,
    Idle,
}

impl ConsumerStatus {
    pub fn from_running(running: bool) -> Self {
        if running { Self::Consuming } else { Self::Idle }
    }
}

/// State reported by a consumption binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingState {
    Running,
    Paused,
}

impl BindingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingState::Running => "running",
            BindingState::Paused => "paused",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, BindingState::Running)
    }
}

impl fmt::Display for BindingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
