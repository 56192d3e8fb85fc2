use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;

use crate::domain::{DocumentKey, ProcessingRecord, ProcessingStatus};

use super::DedupTracker;

/// Process-wide bookkeeping shared by the consumers and the control API:
/// processing records, the dedup tracker and the set of documents currently
/// being worked on.
#[derive(Debug, Default)]
pub struct ProcessingLedger {
    records: DashMap<DocumentKey, ProcessingRecord>,
    dedup: DedupTracker,
    in_flight: DashSet<DocumentKey>,
    // Writers of records and dedup entries share it; `clear` takes it alone.
    clear_gate: RwLock<()>,
}

/// Exclusive claim on a document; released when dropped.
#[derive(Debug)]
pub struct InFlightClaim<'a> {
    ledger: &'a ProcessingLedger,
    key: DocumentKey,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.ledger.in_flight.remove(&self.key);
    }
}

impl ProcessingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dedup(&self) -> &DedupTracker {
        &self.dedup
    }

    pub fn is_processed(&self, key: &DocumentKey) -> bool {
        self.dedup.contains(key)
    }

    /// Returns `None` when another worker already holds the document.
    pub fn try_claim(&self, key: DocumentKey) -> Option<InFlightClaim<'_>> {
        if self.in_flight.insert(key) {
            Some(InFlightClaim { ledger: self, key })
        } else {
            None
        }
    }

    pub fn is_in_flight(&self, key: &DocumentKey) -> bool {
        self.in_flight.contains(key)
    }

    /// Inserts a `PROCESSING` record, replacing any earlier failed attempt.
    pub fn begin(&self, record: ProcessingRecord) {
        let _gate = self.clear_gate.read();
        self.records.insert(record.key, record);
    }

    /// Marks the record `COMPLETED` and adds the key to the dedup tracker
    /// while the record is still held.
    ///
    /// Returns `false` when the record is gone, which happens when a reset
    /// cleared the ledger mid-flight; nothing is marked in that case.
    pub fn complete(
        &self,
        key: &DocumentKey,
        file_size_bytes: u64,
        chunk_count: usize,
        content_type: &str,
        output_url: String,
    ) -> bool {
        let _gate = self.clear_gate.read();
        match self.records.get_mut(key) {
            Some(mut record) => {
                record.complete(file_size_bytes, chunk_count, content_type, output_url);
                self.dedup.mark_processed(*key);
                true
            }
            None => {
                tracing::debug!(document_key = %key, "Record cleared before completion");
                false
            }
        }
    }

    pub fn fail(&self, key: &DocumentKey, error_message: String) {
        let _gate = self.clear_gate.read();
        if let Some(mut record) = self.records.get_mut(key) {
            record.fail(error_message);
        }
    }

    pub fn record(&self, key: &DocumentKey) -> Option<ProcessingRecord> {
        self.records.get(key).map(|r| r.value().clone())
    }

    /// All records, oldest `processedAt` first.
    pub fn records(&self) -> Vec<ProcessingRecord> {
        let mut records: Vec<ProcessingRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| {
            a.processed_at
                .cmp(&b.processed_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        records
    }

    pub fn completed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == ProcessingStatus::Completed)
            .count()
    }

    /// Clears records and dedup entries, returning how many records were
    /// dropped. In-flight claims are left to their owners.
    pub fn clear(&self) -> usize {
        let _gate = self.clear_gate.write();
        let cleared = self.records.len();
        self.records.clear();
        self.dedup.clear();
        cleared
    }
}
