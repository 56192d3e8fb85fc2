use std::fmt;

use serde::Serialize;

/// Category attached to every failed or rejected document attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCategory {
    UnsupportedSourceType,
    MissingReference,
    ExtractionParseError,
    ExtractionEmptyResult,
    IoError,
    ResourceExhaustion,
    Timeout,
    Unknown,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::UnsupportedSourceType => "UNSUPPORTED_SOURCE_TYPE",
            FailureCategory::MissingReference => "MISSING_REFERENCE",
            FailureCategory::ExtractionParseError => "EXTRACTION_PARSE_ERROR",
            FailureCategory::ExtractionEmptyResult => "EXTRACTION_EMPTY_RESULT",
            FailureCategory::IoError => "IO_ERROR",
            FailureCategory::ResourceExhaustion => "RESOURCE_EXHAUSTION",
            FailureCategory::Timeout => "TIMEOUT",
            FailureCategory::Unknown => "UNKNOWN",
        }
    }

    /// Soft failures are expected outcomes rather than faults and log at `warn`.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            FailureCategory::ExtractionEmptyResult | FailureCategory::UnsupportedSourceType
        )
    }

    /// Failures a later attempt may get past, so the message goes back on its queue.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureCategory::IoError
                | FailureCategory::Timeout
                | FailureCategory::ExtractionEmptyResult
        )
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
