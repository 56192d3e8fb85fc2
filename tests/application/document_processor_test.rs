use std::sync::Arc;
use std::time::Duration;

use docstream::application::ports::{
    Disposition, DurableStore, HEADER_CHUNK_INDEX, HEADER_DOCUMENT_KEY, HEADER_TOTAL_CHUNKS,
    MessageHandler,
};
use docstream::application::services::{ProcessOutcome, ProcessingLedger, SkipReason};
use docstream::domain::{
    DocumentKey, DocumentReference, DocumentStage, EmissionMode, FailureCategory,
    OutboundEnvelope, ProcessingStatus, SourceKind, StoragePath,
};

use crate::helpers::{
    BASE_URL, ClearingExtractor, FlakyExtractor, MockFetcher, OUTPUT_DESTINATION, PipelineBuilder, StaticExtractor,
    envelope, raw_envelope, sample_text, staged_files, wait_until,
};

const NOTES_URL: &str = "http://files.example/notes.txt";

fn key_of(url: &str) -> DocumentKey {
    DocumentKey::from_reference(&DocumentReference::new(url))
}

#[tokio::test]
async fn given_text_document_when_processed_then_output_written_and_record_completed() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, sample_text(2)));
    let pipeline = PipelineBuilder::new(fetcher).build();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    let ProcessOutcome::Completed {
        key,
        output_url,
        chunk_count,
    } = outcome
    else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(key, key_of(NOTES_URL));
    assert_eq!(output_url, format!("{BASE_URL}/processed/notes.txt.txt"));
    assert!(chunk_count >= 1);

    let written = pipeline
        .durable_store
        .read(&StoragePath::from_raw("processed/notes.txt.txt"))
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&written).contains("Paragraph 1 sentence 7"));

    let record = pipeline.ledger.record(&key).unwrap();
    assert_eq!(record.status, ProcessingStatus::Completed);
    assert_eq!(record.filename, "notes.txt");
    assert_eq!(record.chunk_count, chunk_count);
    assert_eq!(record.content_type, "text/plain");
    assert!(record.file_size_bytes > 0);
    assert!(pipeline.ledger.is_processed(&key));
}

#[tokio::test]
async fn given_completed_document_when_processed_then_outbound_envelope_points_at_output() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "Short note."));
    let pipeline = PipelineBuilder::new(fetcher).build();

    pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    let messages = pipeline.broker.drain(OUTPUT_DESTINATION);
    assert_eq!(messages.len(), 1);

    let outbound: OutboundEnvelope = serde_json::from_str(&messages[0].payload).unwrap();
    assert_eq!(outbound.source_type, SourceKind::Hdfs);
    assert!(outbound.processed);
    assert_eq!(outbound.url, format!("{BASE_URL}/processed/notes.txt.txt"));
    assert_eq!(outbound.original_file.as_str(), NOTES_URL);
    assert_eq!(
        messages[0].header(HEADER_DOCUMENT_KEY),
        Some(key_of(NOTES_URL).to_hex().as_str())
    );
    assert!(messages[0].header(HEADER_CHUNK_INDEX).is_none());
}

#[tokio::test]
async fn given_processed_document_when_redelivered_then_skipped_without_download() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "Short note."));
    let pipeline = PipelineBuilder::new(fetcher.clone()).build();
    let message = envelope(SourceKind::Http, NOTES_URL);

    pipeline.processor.process(&message).await;
    let outcome = pipeline.processor.process(&message).await;

    assert_eq!(
        outcome,
        ProcessOutcome::Skipped {
            key: key_of(NOTES_URL),
            reason: SkipReason::AlreadyProcessed,
        }
    );
    assert_eq!(fetcher.opens(), 1);
    assert_eq!(pipeline.ledger.records().len(), 1);
    assert_eq!(pipeline.broker.queued(OUTPUT_DESTINATION), 1);
}

#[tokio::test]
async fn given_extraction_failure_when_redelivered_then_document_runs_again() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "Recoverable text."));
    let pipeline = PipelineBuilder::new(fetcher.clone())
        .extractor(Arc::new(FlakyExtractor::failing_times(1)))
        .build();
    let message = envelope(SourceKind::Http, NOTES_URL);
    let key = key_of(NOTES_URL);

    let first = pipeline.processor.process(&message).await;
    assert_eq!(first.category(), Some(FailureCategory::ExtractionParseError));
    assert!(!pipeline.ledger.is_processed(&key));
    assert_eq!(
        pipeline.ledger.record(&key).unwrap().status,
        ProcessingStatus::Failed
    );

    let second = pipeline.processor.process(&message).await;
    assert!(matches!(second, ProcessOutcome::Completed { .. }));
    assert!(pipeline.ledger.is_processed(&key));
    assert_eq!(fetcher.opens(), 2);
}

#[tokio::test]
async fn given_blank_document_when_processed_then_soft_failure_and_not_marked() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "   \n\n \u{000C}  "));
    let pipeline = PipelineBuilder::new(fetcher).build();
    let key = key_of(NOTES_URL);

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    let ProcessOutcome::Failed {
        stage, category, ..
    } = outcome
    else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(category, FailureCategory::ExtractionEmptyResult);
    assert_eq!(stage, DocumentStage::Extracting);
    assert!(!pipeline.ledger.is_processed(&key));
    assert_eq!(pipeline.broker.queued(OUTPUT_DESTINATION), 0);
}

#[tokio::test]
async fn given_unsupported_source_type_when_processed_then_fails_fast_without_record() {
    let pipeline = PipelineBuilder::new(Arc::new(MockFetcher::new())).build();

    let outcome = pipeline
        .processor
        .process(&raw_envelope(r#"{"type":"FTP","url":"ftp://host/a.txt"}"#))
        .await;

    assert_eq!(outcome.category(), Some(FailureCategory::UnsupportedSourceType));
    assert!(pipeline.ledger.records().is_empty());
}

#[tokio::test]
async fn given_envelope_without_url_when_processed_then_missing_reference() {
    let pipeline = PipelineBuilder::new(Arc::new(MockFetcher::new())).build();

    let missing = pipeline
        .processor
        .process(&raw_envelope(r#"{"type":"HTTP"}"#))
        .await;
    let blank = pipeline
        .processor
        .process(&raw_envelope(r#"{"type":"HTTP","url":"  "}"#))
        .await;

    assert_eq!(missing.category(), Some(FailureCategory::MissingReference));
    assert_eq!(blank.category(), Some(FailureCategory::MissingReference));
    assert!(pipeline.ledger.records().is_empty());
}

#[tokio::test]
async fn given_malformed_payload_when_processed_then_unknown_failure() {
    let pipeline = PipelineBuilder::new(Arc::new(MockFetcher::new())).build();

    let outcome = pipeline.processor.process(&raw_envelope("not json")).await;

    assert_eq!(outcome.category(), Some(FailureCategory::Unknown));
    assert_eq!(outcome.stage(), DocumentStage::Failed);
}

#[tokio::test]
async fn given_unreachable_reference_when_processed_then_io_error_at_download() {
    let pipeline = PipelineBuilder::new(Arc::new(MockFetcher::new())).build();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, "http://files.example/missing.txt"))
        .await;

    let ProcessOutcome::Failed {
        stage, category, ..
    } = outcome
    else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(category, FailureCategory::IoError);
    assert_eq!(stage, DocumentStage::Downloading);
}

#[tokio::test]
async fn given_document_over_size_limit_when_processed_then_resource_exhaustion() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, vec![b'a'; 4096]));
    let pipeline = PipelineBuilder::new(fetcher).max_document_bytes(1024).build();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    assert_eq!(outcome.category(), Some(FailureCategory::ResourceExhaustion));
    assert_eq!(staged_files(&pipeline.staging_dir), 0);
}

#[tokio::test]
async fn given_slow_source_when_processed_then_timeout_category() {
    let fetcher = Arc::new(MockFetcher::with_delay(Duration::from_millis(300)));
    fetcher.insert(NOTES_URL, "late");
    let pipeline = PipelineBuilder::new(fetcher)
        .download_timeout(Duration::from_millis(20))
        .build();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    assert_eq!(outcome.category(), Some(FailureCategory::Timeout));
}

#[tokio::test]
async fn given_success_or_failure_when_processed_then_staging_is_released() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_document(NOTES_URL, "Kept text.")
            .with_document("http://files.example/blank.txt", "   "),
    );
    let pipeline = PipelineBuilder::new(fetcher).build();

    pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;
    pipeline
        .processor
        .process(&envelope(SourceKind::Http, "http://files.example/blank.txt"))
        .await;

    assert_eq!(staged_files(&pipeline.staging_dir), 0);
}

#[tokio::test]
async fn given_doc_42_pdf_with_256kb_chunks_when_processed_then_counted_and_deduplicated() {
    let url = "hdfs://namenode:8020/incoming/doc-42.pdf";
    let fetcher = Arc::new(MockFetcher::new().with_document(url, b"%PDF-1.7 stand-in".to_vec()));
    let pipeline = PipelineBuilder::new(fetcher)
        .extractor(Arc::new(StaticExtractor::new(&[
            "Quarterly figures for the northern region.",
            "Appendix with methodology notes.",
        ])))
        .build();
    let before = pipeline.ledger.completed_count();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Hdfs, url))
        .await;

    assert!(matches!(outcome, ProcessOutcome::Completed { .. }));
    assert_eq!(pipeline.ledger.completed_count(), before + 1);
    let key = key_of(url);
    let record = pipeline.ledger.record(&key).unwrap();
    assert_eq!(record.filename, "doc-42.pdf");
    assert_eq!(record.chunk_size_config, 256 * 1024);
    assert_eq!(record.content_type, "application/pdf");
    assert!(record.chunk_count >= 1);
    assert!(pipeline.ledger.dedup().contains(&key));
}

#[tokio::test]
async fn given_chunk_emission_when_processed_then_one_message_per_chunk_in_index_order() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, sample_text(2)));
    let pages: Vec<String> = (0..4).map(|p| format!("Page {p} body text.")).collect();
    let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
    let pipeline = PipelineBuilder::new(fetcher)
        .extractor(Arc::new(StaticExtractor::new(&page_refs)))
        .emission(EmissionMode::Chunks)
        .build();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;
    let ProcessOutcome::Completed { chunk_count, .. } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(chunk_count, 4);

    let broker = pipeline.broker.clone();
    assert!(
        wait_until(
            || broker.queued(OUTPUT_DESTINATION) == 4,
            Duration::from_secs(2)
        )
        .await
    );

    let messages = pipeline.broker.drain(OUTPUT_DESTINATION);
    for (expected_index, message) in messages.iter().enumerate() {
        assert_eq!(
            message.header(HEADER_CHUNK_INDEX),
            Some(expected_index.to_string().as_str())
        );
        assert_eq!(message.header(HEADER_TOTAL_CHUNKS), Some("4"));
        let outbound: OutboundEnvelope = serde_json::from_str(&message.payload).unwrap();
        assert_eq!(
            outbound.url,
            format!("{BASE_URL}/processed/notes.txt/chunk-{expected_index:05}.txt")
        );
    }

    let third = pipeline
        .durable_store
        .read(&StoragePath::from_raw("processed/notes.txt/chunk-00002.txt"))
        .await
        .unwrap();
    assert_eq!(&third[..], b"Page 2 body text.");
}

#[tokio::test]
async fn given_reference_with_spaces_when_processed_then_output_name_is_url_safe() {
    let url = "http://files.example/reports/Annual%20Report%202023.txt";
    let fetcher = Arc::new(MockFetcher::new().with_document(url, "Annual numbers."));
    let pipeline = PipelineBuilder::new(fetcher).build();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, url))
        .await;

    let ProcessOutcome::Completed { output_url, .. } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(
        output_url,
        format!("{BASE_URL}/processed/Annual_Report_2023.txt.txt")
    );
    let record = pipeline.ledger.record(&key_of(url)).unwrap();
    assert_eq!(record.filename, "Annual Report 2023.txt");
}

#[tokio::test]
async fn given_same_document_twice_concurrently_when_processed_then_second_is_skipped_in_flight() {
    let fetcher = Arc::new(MockFetcher::with_delay(Duration::from_millis(100)));
    fetcher.insert(NOTES_URL, "Concurrent text.");
    let pipeline = PipelineBuilder::new(fetcher.clone()).build();
    let message = envelope(SourceKind::Http, NOTES_URL);

    let (first, second) = tokio::join!(
        pipeline.processor.process(&message),
        pipeline.processor.process(&message)
    );

    let outcomes = [first, second];
    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, ProcessOutcome::Completed { .. }))
        .count();
    let skipped_in_flight = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                ProcessOutcome::Skipped {
                    reason: SkipReason::InFlight,
                    ..
                }
            )
        })
        .count();
    assert_eq!(completed, 1);
    assert_eq!(skipped_in_flight, 1);
    assert_eq!(fetcher.opens(), 1);
    assert!(!pipeline.ledger.is_in_flight(&key_of(NOTES_URL)));
}

#[tokio::test]
async fn given_mixed_outcomes_when_processed_then_dedup_matches_completed_records() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_document("http://files.example/a.txt", "Alpha.")
            .with_document("http://files.example/b.txt", " ")
            .with_document("http://files.example/c.txt", "Gamma."),
    );
    let pipeline = PipelineBuilder::new(fetcher).build();

    for name in ["a", "b", "c", "missing"] {
        let url = format!("http://files.example/{name}.txt");
        pipeline
            .processor
            .process(&envelope(SourceKind::Http, &url))
            .await;
    }

    for record in pipeline.ledger.records() {
        let completed = record.status == ProcessingStatus::Completed;
        assert_eq!(pipeline.ledger.is_processed(&record.key), completed);
    }
    assert_eq!(pipeline.ledger.completed_count(), 2);
    assert_eq!(pipeline.ledger.dedup().len(), 2);
}

#[tokio::test]
async fn given_output_directory_missing_when_processed_then_directory_is_created() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "Text."));
    let pipeline = PipelineBuilder::new(fetcher).build();
    let output_dir = StoragePath::from_raw("processed");
    assert!(!pipeline.durable_store.exists(&output_dir).await.unwrap());

    pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    let files = pipeline.durable_store.list(&output_dir).await.unwrap();
    assert_eq!(files, vec!["notes.txt.txt".to_string()]);
}

#[tokio::test]
async fn given_reset_during_extraction_when_document_finishes_then_skipped_without_emission() {
    let ledger = Arc::new(ProcessingLedger::new());
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "Short note."));
    let pipeline = PipelineBuilder::new(fetcher)
        .ledger(Arc::clone(&ledger))
        .extractor(Arc::new(ClearingExtractor::new(Arc::clone(&ledger))))
        .build();

    let outcome = pipeline
        .processor
        .process(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    assert_eq!(
        outcome,
        ProcessOutcome::Skipped {
            key: key_of(NOTES_URL),
            reason: SkipReason::Cleared,
        }
    );
    assert_eq!(pipeline.broker.queued(OUTPUT_DESTINATION), 0);
    assert!(ledger.record(&key_of(NOTES_URL)).is_none());
    assert!(!ledger.is_processed(&key_of(NOTES_URL)));
    assert!(
        !pipeline
            .durable_store
            .exists(&StoragePath::from_raw("processed/notes.txt.txt"))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn given_transient_failure_when_handled_then_requeue_requested() {
    let fetcher = Arc::new(MockFetcher::new());
    let pipeline = PipelineBuilder::new(fetcher).build();

    let disposition = pipeline
        .processor
        .handle(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    assert_eq!(disposition, Disposition::Requeue);
    let record = pipeline.ledger.record(&key_of(NOTES_URL)).unwrap();
    assert_eq!(record.status, ProcessingStatus::Failed);
}

#[tokio::test]
async fn given_permanent_failure_when_handled_then_acknowledged() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "Text."));
    let pipeline = PipelineBuilder::new(fetcher)
        .extractor(Arc::new(FlakyExtractor::failing_times(1)))
        .build();

    let parse_failure = pipeline
        .processor
        .handle(&envelope(SourceKind::Http, NOTES_URL))
        .await;
    let malformed = pipeline.processor.handle(&raw_envelope("{not json")).await;

    assert_eq!(parse_failure, Disposition::Ack);
    assert_eq!(malformed, Disposition::Ack);
}

#[tokio::test]
async fn given_empty_extraction_when_handled_then_requeue_requested() {
    let fetcher = Arc::new(MockFetcher::new().with_document(NOTES_URL, "Text."));
    let pipeline = PipelineBuilder::new(fetcher)
        .extractor(Arc::new(FlakyExtractor::empty_times(1)))
        .build();

    let disposition = pipeline
        .processor
        .handle(&envelope(SourceKind::Http, NOTES_URL))
        .await;

    assert_eq!(disposition, Disposition::Requeue);
}
