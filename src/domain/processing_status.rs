use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Persistent status of a [`super::ProcessingRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Processing => "PROCESSING",
            ProcessingStatus::Completed => "COMPLETED",
            ProcessingStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for ProcessingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(ProcessingStatus::Processing),
            "COMPLETED" => Ok(ProcessingStatus::Completed),
            "FAILED" => Ok(ProcessingStatus::Failed),
            _ => Err(format!("Invalid processing status: {}", s)),
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient stage of one document moving through the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentStage {
    Received,
    Downloading,
    Extracting,
    Chunking,
    Persisting,
    Completed,
    Skipped,
    Failed,
}

impl DocumentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStage::Received => "RECEIVED",
            DocumentStage::Downloading => "DOWNLOADING",
            DocumentStage::Extracting => "EXTRACTING",
            DocumentStage::Chunking => "CHUNKING",
            DocumentStage::Persisting => "PERSISTING",
            DocumentStage::Completed => "COMPLETED",
            DocumentStage::Skipped => "SKIPPED",
            DocumentStage::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DocumentStage::Completed | DocumentStage::Skipped | DocumentStage::Failed
        )
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: DocumentStage) -> bool {
        use DocumentStage::*;
        matches!(
            (self, next),
            (Received, Downloading)
                | (Received, Skipped)
                | (Downloading, Extracting)
                | (Extracting, Chunking)
                | (Chunking, Persisting)
                | (Persisting, Completed)
                | (Downloading | Extracting | Chunking | Persisting, Failed)
        )
    }
}

impl fmt::Display for DocumentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
