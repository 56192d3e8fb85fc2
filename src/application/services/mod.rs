mod consumption_binding_controller;
mod dedup_tracker;
mod document_ingress;
mod document_processor;
mod pending_reporter;
mod processing_control;
mod processing_ledger;
mod token_counter;

pub use consumption_binding_controller::ConsumptionBindingController;
pub use dedup_tracker::DedupTracker;
pub use document_ingress::{DocumentIngress, IngressError};
pub use document_processor::{
    DocumentProcessingError, DocumentProcessor, ProcessOutcome, ProcessorConfig, SkipReason,
};
pub use pending_reporter::{PendingError, PendingReport, PendingReporter};
pub use processing_control::{ProcessingControl, ResetReport, ToggleResult};
pub use processing_ledger::{InFlightClaim, ProcessingLedger};
pub use token_counter::count_tokens;
