mod consumption_controller;
mod document_fetcher;
mod durable_store;
mod message_transport;
mod processing_state_listener;
mod staging_store;
mod text_extractor;
mod text_splitter;

pub use consumption_controller::{ConsumptionController, ConsumptionError};
pub use document_fetcher::{DocumentFetcher, FetchError, FetchedDocument};
pub use durable_store::{DurableStore, DurableStoreError};
pub use message_transport::{
    Disposition, HEADER_CHUNK_INDEX, HEADER_DELIVERY_ATTEMPT, HEADER_DOCUMENT_KEY,
    HEADER_TOTAL_CHUNKS, MessageHandler, MessagePublisher, QueueInspector, TransportError,
    TransportMessage,
};
pub use processing_state_listener::{ProcessingStateEvent, ProcessingStateListener};
pub use staging_store::{StagingStore, StagingStoreError};
pub use text_extractor::{ExtractionError, TextExtractor};
pub use text_splitter::{TextSplitter, TextSplitterError};
