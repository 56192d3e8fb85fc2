pub mod fetch;
pub mod messaging;
pub mod observability;
pub mod storage;
pub mod text_processing;
