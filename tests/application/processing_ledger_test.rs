use std::sync::Arc;

use docstream::application::services::ProcessingLedger;
use docstream::domain::{DocumentKey, DocumentReference, ProcessingRecord, ProcessingStatus};

fn key(reference: &str) -> DocumentKey {
    DocumentKey::from_reference(&DocumentReference::new(reference))
}

fn begin(ledger: &ProcessingLedger, reference: &str) -> DocumentKey {
    let key = key(reference);
    ledger.begin(ProcessingRecord::started(
        key,
        reference.rsplit('/').next().unwrap().to_string(),
        262_144,
    ));
    key
}

#[test]
fn given_started_record_when_read_then_status_is_processing_and_not_deduplicated() {
    let ledger = ProcessingLedger::new();
    let key = begin(&ledger, "hdfs://nn/a.pdf");

    let record = ledger.record(&key).unwrap();
    assert_eq!(record.status, ProcessingStatus::Processing);
    assert_eq!(record.chunk_size_config, 262_144);
    assert!(!ledger.is_processed(&key));
}

#[test]
fn given_started_record_when_completed_then_marked_in_dedup() {
    let ledger = ProcessingLedger::new();
    let key = begin(&ledger, "hdfs://nn/a.pdf");

    ledger.complete(&key, 2048, 3, "application/pdf", "hdfs://nn/processed/a.pdf.txt".into());

    let record = ledger.record(&key).unwrap();
    assert_eq!(record.status, ProcessingStatus::Completed);
    assert_eq!(record.chunk_count, 3);
    assert_eq!(record.file_size_bytes, 2048);
    assert!(ledger.is_processed(&key));
    assert_eq!(ledger.completed_count(), 1);
}

#[test]
fn given_started_record_when_failed_then_not_marked_in_dedup() {
    let ledger = ProcessingLedger::new();
    let key = begin(&ledger, "hdfs://nn/a.pdf");

    ledger.fail(&key, "IO_ERROR: connection reset".into());

    let record = ledger.record(&key).unwrap();
    assert_eq!(record.status, ProcessingStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("IO_ERROR: connection reset"));
    assert!(!ledger.is_processed(&key));
}

#[test]
fn given_completion_without_record_when_completed_then_dedup_untouched() {
    let ledger = ProcessingLedger::new();
    let key = key("hdfs://nn/ghost.pdf");

    let completed = ledger.complete(&key, 1, 1, "text/plain", "hdfs://nn/x".into());

    assert!(!completed);
    assert!(!ledger.is_processed(&key));
}

#[test]
fn given_claimed_document_when_claimed_again_then_rejected_until_released() {
    let ledger = ProcessingLedger::new();
    let key = key("hdfs://nn/a.pdf");

    let claim = ledger.try_claim(key);
    assert!(claim.is_some());
    assert!(ledger.try_claim(key).is_none());
    assert!(ledger.is_in_flight(&key));

    drop(claim);
    assert!(!ledger.is_in_flight(&key));
    assert!(ledger.try_claim(key).is_some());
}

#[test]
fn given_several_records_when_listed_then_sorted_by_processed_at() {
    let ledger = ProcessingLedger::new();
    let first = begin(&ledger, "hdfs://nn/first.pdf");
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = begin(&ledger, "hdfs://nn/second.pdf");
    std::thread::sleep(std::time::Duration::from_millis(5));
    ledger.complete(&first, 10, 1, "application/pdf", "hdfs://nn/out".into());

    let records = ledger.records();
    let keys: Vec<DocumentKey> = records.iter().map(|r| r.key).collect();
    assert_eq!(keys, vec![second, first]);
}

#[test]
fn given_completed_records_when_cleared_then_records_and_dedup_are_empty() {
    let ledger = ProcessingLedger::new();
    let a = begin(&ledger, "hdfs://nn/a.pdf");
    let b = begin(&ledger, "hdfs://nn/b.pdf");
    ledger.complete(&a, 1, 1, "text/plain", "hdfs://nn/a".into());

    let cleared = ledger.clear();

    assert_eq!(cleared, 2);
    assert!(ledger.records().is_empty());
    assert!(!ledger.is_processed(&a));
    assert!(ledger.record(&b).is_none());
    assert_eq!(ledger.completed_count(), 0);
}

#[test]
fn given_concurrent_completions_and_clears_then_dedup_always_matches_completed_records() {
    let ledger = Arc::new(ProcessingLedger::new());
    let references: Vec<String> = (0..64).map(|i| format!("hdfs://nn/doc-{i}.pdf")).collect();

    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let ledger = Arc::clone(&ledger);
            let references = references.clone();
            std::thread::spawn(move || {
                for round in 0..200 {
                    let reference = &references[(worker * 16 + round) % references.len()];
                    let key = begin(&ledger, reference);
                    ledger.complete(&key, 1, 1, "text/plain", "hdfs://nn/out".into());
                }
            })
        })
        .collect();
    let clearer = {
        let ledger = Arc::clone(&ledger);
        std::thread::spawn(move || {
            for _ in 0..200 {
                ledger.clear();
                std::thread::yield_now();
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    clearer.join().unwrap();

    for reference in &references {
        let key = key(reference);
        let completed = ledger
            .record(&key)
            .is_some_and(|r| r.status == ProcessingStatus::Completed);
        assert_eq!(ledger.is_processed(&key), completed, "{reference}");
    }
}

#[test]
fn given_cleared_ledger_when_in_flight_document_completes_then_reports_not_completed() {
    let ledger = ProcessingLedger::new();
    let key = begin(&ledger, "hdfs://nn/a.pdf");

    ledger.clear();
    let completed = ledger.complete(&key, 1, 1, "text/plain", "hdfs://nn/a".into());

    assert!(!completed);
    assert!(ledger.record(&key).is_none());
    assert!(!ledger.is_processed(&key));
}
