use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DocumentKey, ProcessingStatus};

/// Per-document metadata kept in memory until a reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingRecord {
    #[serde(rename = "documentKey")]
    pub key: DocumentKey,
    pub filename: String,
    pub file_size_bytes: u64,
    pub chunk_size_config: usize,
    pub chunk_count: usize,
    pub status: ProcessingStatus,
    pub processed_at: DateTime<Utc>,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProcessingRecord {
    pub fn started(key: DocumentKey, filename: String, chunk_size_config: usize) -> Self {
        Self {
            key,
            filename,
            file_size_bytes: 0,
            chunk_size_config,
            chunk_count: 0,
            status: ProcessingStatus::Processing,
            processed_at: Utc::now(),
            content_type: String::new(),
            output_url: None,
            error_message: None,
        }
    }

    pub fn complete(
        &mut self,
        file_size_bytes: u64,
        chunk_count: usize,
        content_type: &str,
        output_url: String,
    ) {
        self.file_size_bytes = file_size_bytes;
        self.chunk_count = chunk_count;
        self.content_type = content_type.to_string();
        self.output_url = Some(output_url);
        self.status = ProcessingStatus::Completed;
        self.processed_at = Utc::now();
    }

    pub fn fail(&mut self, error_message: String) {
        self.status = ProcessingStatus::Failed;
        self.error_message = Some(error_message);
        self.processed_at = Utc::now();
    }
}
