use serde::{Deserialize, Serialize};

/// How completed documents are announced downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionMode {
    /// One outbound message per document, pointing at the full text.
    Document,
    /// One outbound message per chunk, carrying index headers.
    Chunks,
}

/// What `GET /files/pending` counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingMode {
    /// Messages waiting on the input destination.
    Queue,
    /// Files waiting in the durable store's input directory.
    Directory,
}
