mod documents;
mod files;
mod health;
mod processing;

pub use documents::{SubmitResponse, submit_document_handler};
pub use files::{ErrorResponse, PendingResponse, pending_files_handler, processed_files_handler};
pub use health::health_handler;
pub use processing::{
    ProcessingStateResponse, ResetResponse, ToggleResponse, TransitionResponse,
    processing_state_handler, reset_processing_handler, start_processing_handler,
    stop_processing_handler, toggle_processing_handler,
};
