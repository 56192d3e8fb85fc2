use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::Instrument;

use crate::application::ports::{
    Disposition, DocumentFetcher, DurableStore, DurableStoreError, ExtractionError, FetchError,
    HEADER_CHUNK_INDEX, HEADER_DOCUMENT_KEY, HEADER_TOTAL_CHUNKS, MessageHandler,
    MessagePublisher, StagingStore, StagingStoreError, TextExtractor, TextSplitter,
    TextSplitterError, TransportError, TransportMessage,
};
use crate::domain::{
    DocumentKey, DocumentStage, EmissionMode, EnvelopeError, FailureCategory, InboundEnvelope,
    OutboundEnvelope, ProcessingRecord, SourceDocument, StoragePath, TextChunk, url_safe_name,
};

use super::ProcessingLedger;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Durable-store directory extracted text is written under.
    pub output_dir: StoragePath,
    /// Destination outbound envelopes are published to.
    pub output_destination: String,
    /// Operator-facing chunk size, recorded on every record.
    pub chunk_size_bytes: usize,
    pub emission: EmissionMode,
    pub max_document_bytes: Option<u64>,
    pub download_timeout: Duration,
    pub extraction_timeout: Duration,
}

/// Why a message was accepted without doing any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyProcessed,
    InFlight,
    /// A reset cleared the ledger while the document was being processed.
    Cleared,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::AlreadyProcessed => "already_processed",
            SkipReason::InFlight => "in_flight",
            SkipReason::Cleared => "cleared",
        }
    }
}

/// Terminal result of one message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Completed {
        key: DocumentKey,
        output_url: String,
        chunk_count: usize,
    },
    Skipped {
        key: DocumentKey,
        reason: SkipReason,
    },
    Failed {
        key: Option<DocumentKey>,
        stage: DocumentStage,
        category: FailureCategory,
        message: String,
    },
}

impl ProcessOutcome {
    pub fn stage(&self) -> DocumentStage {
        match self {
            ProcessOutcome::Completed { .. } => DocumentStage::Completed,
            ProcessOutcome::Skipped { .. } => DocumentStage::Skipped,
            ProcessOutcome::Failed { .. } => DocumentStage::Failed,
        }
    }

    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            ProcessOutcome::Failed { category, .. } => Some(*category),
            _ => None,
        }
    }

    /// Retryable failures of a known document go back on the queue;
    /// everything else is acknowledged.
    pub fn disposition(&self) -> Disposition {
        match self {
            ProcessOutcome::Failed {
                key: Some(_),
                category,
                ..
            } if category.is_retryable() => Disposition::Requeue,
            _ => Disposition::Ack,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentProcessingError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("unsupported source type: {0:?}")]
    UnsupportedSourceType(String),
    #[error("envelope carries no document reference")]
    MissingReference,
    #[error("download failed: {0}")]
    Download(#[from] FetchError),
    #[error("download exceeded {0}s")]
    DownloadTimeout(u64),
    #[error("staging failed: {0}")]
    Staging(#[from] StagingStoreError),
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("extraction produced no text")]
    EmptyExtraction,
    #[error("splitting failed: {0}")]
    Splitting(#[from] TextSplitterError),
    #[error("persisting output failed: {0}")]
    Persistence(#[from] DurableStoreError),
}

impl DocumentProcessingError {
    pub fn category(&self) -> FailureCategory {
        match self {
            DocumentProcessingError::MalformedEnvelope(_) => FailureCategory::Unknown,
            DocumentProcessingError::UnsupportedSourceType(_) => {
                FailureCategory::UnsupportedSourceType
            }
            DocumentProcessingError::MissingReference => FailureCategory::MissingReference,
            DocumentProcessingError::Download(FetchError::Timeout(_))
            | DocumentProcessingError::DownloadTimeout(_)
            | DocumentProcessingError::Extraction(ExtractionError::Timeout(_)) => {
                FailureCategory::Timeout
            }
            DocumentProcessingError::Download(FetchError::UnsupportedKind(_)) => {
                FailureCategory::UnsupportedSourceType
            }
            DocumentProcessingError::Download(_) => FailureCategory::IoError,
            DocumentProcessingError::Staging(StagingStoreError::TooLarge { .. }) => {
                FailureCategory::ResourceExhaustion
            }
            DocumentProcessingError::Staging(StagingStoreError::Io(e))
                if e.kind() == std::io::ErrorKind::TimedOut =>
            {
                FailureCategory::Timeout
            }
            DocumentProcessingError::Staging(_) => FailureCategory::IoError,
            DocumentProcessingError::Extraction(ExtractionError::NoTextFound(_))
            | DocumentProcessingError::EmptyExtraction => FailureCategory::ExtractionEmptyResult,
            DocumentProcessingError::Extraction(ExtractionError::ExtractionFailed(_)) => {
                FailureCategory::Unknown
            }
            DocumentProcessingError::Extraction(_) => FailureCategory::ExtractionParseError,
            DocumentProcessingError::Splitting(TextSplitterError::TooManyChunks { .. }) => {
                FailureCategory::ResourceExhaustion
            }
            DocumentProcessingError::Splitting(_) => FailureCategory::Unknown,
            DocumentProcessingError::Persistence(_) => FailureCategory::IoError,
        }
    }
}

struct Extracted {
    file_size_bytes: u64,
    full_text: String,
    chunks: Vec<TextChunk>,
}

struct Persisted {
    text_path: StoragePath,
    chunk_paths: Vec<StoragePath>,
}

/// Runs one inbound envelope through download, extraction, chunking and
/// persistence, then announces the result downstream.
pub struct DocumentProcessor {
    fetcher: Arc<dyn DocumentFetcher>,
    staging_store: Arc<dyn StagingStore>,
    extractor: Arc<dyn TextExtractor>,
    splitter: Arc<dyn TextSplitter>,
    durable_store: Arc<dyn DurableStore>,
    publisher: Arc<dyn MessagePublisher>,
    ledger: Arc<ProcessingLedger>,
    config: ProcessorConfig,
}

impl DocumentProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        staging_store: Arc<dyn StagingStore>,
        extractor: Arc<dyn TextExtractor>,
        splitter: Arc<dyn TextSplitter>,
        durable_store: Arc<dyn DurableStore>,
        publisher: Arc<dyn MessagePublisher>,
        ledger: Arc<ProcessingLedger>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            fetcher,
            staging_store,
            extractor,
            splitter,
            durable_store,
            publisher,
            ledger,
            config,
        }
    }

    pub fn ledger(&self) -> &Arc<ProcessingLedger> {
        &self.ledger
    }

    /// Processes one transport message to a terminal outcome. Never panics on
    /// document errors; every failure is categorised and logged here.
    pub async fn process(&self, message: &TransportMessage) -> ProcessOutcome {
        let document = match Self::accept(&message.payload) {
            Ok(document) => document,
            Err(e) => {
                let category = e.category();
                log_failure(category, None, &e);
                return ProcessOutcome::Failed {
                    key: None,
                    stage: DocumentStage::Received,
                    category,
                    message: e.to_string(),
                };
            }
        };

        let span = tracing::info_span!(
            "document",
            document_key = %document.key,
            filename = %document.filename,
            source_kind = %document.source_kind,
        );

        self.process_document(document).instrument(span).await
    }

    fn accept(payload: &str) -> Result<SourceDocument, DocumentProcessingError> {
        let envelope: InboundEnvelope = serde_json::from_str(payload)
            .map_err(|e| DocumentProcessingError::MalformedEnvelope(e.to_string()))?;

        envelope.source_document().map_err(|e| match e {
            EnvelopeError::UnsupportedSourceType(kind) => {
                DocumentProcessingError::UnsupportedSourceType(kind)
            }
            EnvelopeError::MissingReference => DocumentProcessingError::MissingReference,
        })
    }

    async fn process_document(&self, document: SourceDocument) -> ProcessOutcome {
        let key = document.key;

        if self.ledger.is_processed(&key) {
            tracing::info!(reason = SkipReason::AlreadyProcessed.as_str(), "Skipping document");
            return ProcessOutcome::Skipped {
                key,
                reason: SkipReason::AlreadyProcessed,
            };
        }

        let Some(_claim) = self.ledger.try_claim(key) else {
            tracing::info!(reason = SkipReason::InFlight.as_str(), "Skipping document");
            return ProcessOutcome::Skipped {
                key,
                reason: SkipReason::InFlight,
            };
        };

        // A concurrent worker may have completed it between the check and the claim.
        if self.ledger.is_processed(&key) {
            return ProcessOutcome::Skipped {
                key,
                reason: SkipReason::AlreadyProcessed,
            };
        }

        self.ledger.begin(ProcessingRecord::started(
            key,
            document.filename.clone(),
            self.config.chunk_size_bytes,
        ));

        let staging_path = StoragePath::staging(&key, &document.filename);
        let mut stage = DocumentStage::Received;

        let result = self.run_pipeline(&document, &staging_path, &mut stage).await;
        self.release_staging(&staging_path).await;

        match result {
            Ok((extracted, persisted)) => self.finish(&document, extracted, persisted).await,
            Err(e) => {
                let category = e.category();
                log_failure(category, Some(stage), &e);
                self.ledger.fail(&key, format!("{category}: {e}"));
                ProcessOutcome::Failed {
                    key: Some(key),
                    stage,
                    category,
                    message: e.to_string(),
                }
            }
        }
    }

    async fn run_pipeline(
        &self,
        document: &SourceDocument,
        staging_path: &StoragePath,
        stage: &mut DocumentStage,
    ) -> Result<(Extracted, Persisted), DocumentProcessingError> {
        advance(stage, DocumentStage::Downloading);
        let file_size_bytes = self.download(document, staging_path).await?;

        advance(stage, DocumentStage::Extracting);
        let data = self.staging_store.fetch(staging_path).await?;
        let segments = tokio::time::timeout(
            self.config.extraction_timeout,
            self.extractor.extract_segments(&data, document),
        )
        .await
        .map_err(|_| ExtractionError::Timeout(self.config.extraction_timeout.as_secs()))??;
        drop(data);

        if segments.iter().all(|s| s.trim().is_empty()) {
            return Err(DocumentProcessingError::EmptyExtraction);
        }

        advance(stage, DocumentStage::Chunking);
        let chunks = self.splitter.split(&segments).await?;
        tracing::debug!(
            chunk_count = chunks.len(),
            target_tokens = self.splitter.target_tokens(),
            "Document split"
        );

        let extracted = Extracted {
            file_size_bytes,
            full_text: segments.join("\n\n"),
            chunks,
        };

        advance(stage, DocumentStage::Persisting);
        let persisted = self.persist(document, &extracted).await?;

        Ok((extracted, persisted))
    }

    async fn download(
        &self,
        document: &SourceDocument,
        staging_path: &StoragePath,
    ) -> Result<u64, DocumentProcessingError> {
        let timeout = self.config.download_timeout;
        let transfer = async {
            let fetched = self
                .fetcher
                .open(&document.reference, document.source_kind)
                .await?;
            if let Some(length) = fetched.content_length {
                tracing::debug!(content_length = length, "Downloading document");
            }
            let size = self
                .staging_store
                .store(staging_path, fetched.stream, self.config.max_document_bytes)
                .await?;
            Ok::<u64, DocumentProcessingError>(size)
        };

        tokio::time::timeout(timeout, transfer)
            .await
            .map_err(|_| DocumentProcessingError::DownloadTimeout(timeout.as_secs()))?
    }

    async fn persist(
        &self,
        document: &SourceDocument,
        extracted: &Extracted,
    ) -> Result<Persisted, DocumentProcessingError> {
        let safe_name = url_safe_name(&document.filename);
        let output_dir = &self.config.output_dir;

        if !self.durable_store.exists(output_dir).await? {
            self.durable_store.mkdir(output_dir).await?;
        }

        let text_path = output_dir.join(&format!("{safe_name}.txt"));
        self.durable_store
            .write(&text_path, Bytes::from(extracted.full_text.clone()))
            .await?;

        let mut chunk_paths = Vec::new();
        if self.config.emission == EmissionMode::Chunks {
            let chunk_dir = output_dir.join(&safe_name);
            chunk_paths.reserve(extracted.chunks.len());
            for chunk in &extracted.chunks {
                let path = chunk_dir.join(&format!("chunk-{:05}.txt", chunk.index));
                self.durable_store
                    .write(&path, Bytes::from(chunk.text.clone()))
                    .await?;
                chunk_paths.push(path);
            }
        }

        tracing::debug!(path = %text_path, chunk_files = chunk_paths.len(), "Output persisted");
        Ok(Persisted {
            text_path,
            chunk_paths,
        })
    }

    async fn finish(
        &self,
        document: &SourceDocument,
        extracted: Extracted,
        persisted: Persisted,
    ) -> ProcessOutcome {
        let output_url = self.durable_store.locate(&persisted.text_path);
        let chunk_count = extracted.chunks.len();

        let completed = self.ledger.complete(
            &document.key,
            extracted.file_size_bytes,
            chunk_count,
            document.content_type.as_mime(),
            output_url.clone(),
        );
        if !completed {
            tracing::warn!(
                reason = SkipReason::Cleared.as_str(),
                "Ledger reset during processing, discarding output"
            );
            self.discard(&persisted).await;
            return ProcessOutcome::Skipped {
                key: document.key,
                reason: SkipReason::Cleared,
            };
        }

        let messages = self.outbound_messages(document, &output_url, &persisted);
        self.emit(messages).await;

        tracing::info!(
            chunk_count,
            file_size_bytes = extracted.file_size_bytes,
            output_url = %output_url,
            "Document processed"
        );

        ProcessOutcome::Completed {
            key: document.key,
            output_url,
            chunk_count,
        }
    }

    async fn discard(&self, persisted: &Persisted) {
        let mut paths = vec![&persisted.text_path];
        paths.extend(&persisted.chunk_paths);
        for path in paths {
            if let Err(e) = self.durable_store.delete(path, false).await {
                tracing::debug!(error = %e, path = %path, "Could not discard output");
            }
        }
    }

    fn outbound_messages(
        &self,
        document: &SourceDocument,
        output_url: &str,
        persisted: &Persisted,
    ) -> Vec<TransportMessage> {
        let kind = self.durable_store.source_kind();
        let key = document.key.to_hex();

        if persisted.chunk_paths.is_empty() {
            let envelope =
                OutboundEnvelope::processed(kind, output_url.to_string(), document.reference.clone());
            return envelope_message(&envelope)
                .map(|m| m.with_header(HEADER_DOCUMENT_KEY, &key))
                .into_iter()
                .collect();
        }

        let total = persisted.chunk_paths.len();
        persisted
            .chunk_paths
            .iter()
            .enumerate()
            .filter_map(|(index, path)| {
                let envelope = OutboundEnvelope::processed(
                    kind,
                    self.durable_store.locate(path),
                    document.reference.clone(),
                );
                envelope_message(&envelope).map(|m| {
                    m.with_header(HEADER_CHUNK_INDEX, index)
                        .with_header(HEADER_TOTAL_CHUNKS, total)
                        .with_header(HEADER_DOCUMENT_KEY, &key)
                })
            })
            .collect()
    }

    /// Publishes the first message inline and the rest, in index order, from
    /// a background task.
    async fn emit(&self, messages: Vec<TransportMessage>) {
        let destination = self.config.output_destination.clone();
        let mut messages = messages.into_iter();

        let Some(first) = messages.next() else {
            return;
        };
        if let Err(e) = self.publisher.publish(&destination, first).await {
            log_publish_error(&destination, &e);
        }

        let remaining: Vec<TransportMessage> = messages.collect();
        if remaining.is_empty() {
            return;
        }

        let publisher = Arc::clone(&self.publisher);
        tokio::spawn(
            async move {
                for message in remaining {
                    if let Err(e) = publisher.publish(&destination, message).await {
                        log_publish_error(&destination, &e);
                    }
                }
            }
            .in_current_span(),
        );
    }

    async fn release_staging(&self, path: &StoragePath) {
        match self.staging_store.delete(path).await {
            Ok(()) | Err(StagingStoreError::NotFound(_)) => {}
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "Failed to delete staged document");
            }
        }
    }
}

#[async_trait]
impl MessageHandler for DocumentProcessor {
    async fn handle(&self, message: &TransportMessage) -> Disposition {
        let outcome = self.process(message).await;
        let disposition = outcome.disposition();
        tracing::debug!(stage = %outcome.stage(), ?disposition, "Message handled");
        disposition
    }
}

fn advance(stage: &mut DocumentStage, next: DocumentStage) {
    debug_assert!(
        stage.can_transition_to(next),
        "illegal stage transition {stage} -> {next}"
    );
    tracing::debug!(from = %stage, to = %next, "Stage transition");
    *stage = next;
}

fn envelope_message(envelope: &OutboundEnvelope) -> Option<TransportMessage> {
    match serde_json::to_string(envelope) {
        Ok(payload) => Some(TransportMessage::new(payload)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialise outbound envelope");
            None
        }
    }
}

fn log_failure(
    category: FailureCategory,
    stage: Option<DocumentStage>,
    error: &DocumentProcessingError,
) {
    let stage = stage.map(|s| s.as_str()).unwrap_or("RECEIVED");
    if category.is_soft() {
        tracing::warn!(category = %category, stage, error = %error, "Document not processed");
    } else {
        tracing::error!(category = %category, stage, error = %error, "Document processing failed");
    }
}

fn log_publish_error(destination: &str, error: &TransportError) {
    tracing::error!(destination, error = %error, "Failed to publish outbound message");
}
