mod chunk_sizing;
mod composite_extractor;
mod extractor_factory;
mod pdf_adapter;
mod plain_text_adapter;
mod text_sanitizer;
mod token_text_splitter;

pub use chunk_sizing::ChunkSizing;
pub use composite_extractor::CompositeExtractor;
pub use extractor_factory::ExtractorFactory;
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::PlainTextAdapter;
pub use text_sanitizer::sanitize_extracted_text;
pub use token_text_splitter::TokenTextSplitter;
