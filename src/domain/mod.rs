mod chunk;
mod document;
mod document_key;
mod document_reference;
mod envelope;
mod failure_category;
mod modes;
mod processing_record;
mod processing_state;
mod processing_status;
mod source_kind;
mod storage_path;

pub use chunk::TextChunk;
pub use document::{ContentType, SourceDocument};
pub use document_key::DocumentKey;
pub use document_reference::DocumentReference;
pub use envelope::{EnvelopeError, InboundEnvelope, OutboundEnvelope};
pub use failure_category::FailureCategory;
pub use modes::{EmissionMode, PendingMode};
pub use processing_record::ProcessingRecord;
pub use processing_state::{
    BindingState, ConsumerStatus, ProcessingStateSnapshot, ProcessingStatusLabel, REASON_INITIAL,
    REASON_RESET, REASON_STARTED, REASON_STOPPED,
};
pub use processing_status::{DocumentStage, ProcessingStatus};
pub use source_kind::SourceKind;
pub use storage_path::{StoragePath, url_safe_name};
