use std::sync::LazyLock;

use tiktoken_rs::CoreBPE;

/// Bytes per token assumed when the tokenizer cannot be loaded.
const FALLBACK_BYTES_PER_TOKEN: usize = 4;

static TOKENIZER: LazyLock<Option<CoreBPE>> = LazyLock::new(|| match tiktoken_rs::cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        tracing::error!(error = %e, "cl100k_base tokenizer unavailable; estimating tokens from bytes");
        None
    }
});

/// cl100k token count of `text`, the measure chunk targets are expressed in.
pub fn count_tokens(text: &str) -> usize {
    match TOKENIZER.as_ref() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.len().div_ceil(FALLBACK_BYTES_PER_TOKEN),
    }
}
