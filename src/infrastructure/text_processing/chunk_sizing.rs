use crate::presentation::config::ChunkingSettings;

/// Smallest piece worth emitting on its own, regardless of target.
const MIN_EMIT_FLOOR_CHARS: usize = 5;

/// Token-denominated limits derived from the operator's byte-sized setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSizing {
    pub configured_bytes: usize,
    pub target_tokens: usize,
    /// A separator may shorten a window only if at least this many bytes remain.
    pub min_chunk_chars: usize,
    /// Trailing pieces shorter than this are folded into the previous chunk.
    pub min_emit_chars: usize,
    pub keep_separator: bool,
    pub max_chunks: usize,
}

impl ChunkSizing {
    /// `chunk_size_bytes / bytes_per_token`, clamped into `min_tokens..=max_tokens`.
    pub fn clamp_tokens(
        chunk_size_bytes: usize,
        bytes_per_token: usize,
        min_tokens: usize,
        max_tokens: usize,
    ) -> usize {
        let raw = chunk_size_bytes / bytes_per_token.max(1);
        raw.clamp(min_tokens.min(max_tokens), max_tokens)
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Self {
        let target_tokens = Self::clamp_tokens(
            settings.chunk_size_bytes,
            settings.bytes_per_token,
            settings.min_tokens,
            settings.max_tokens,
        );

        if target_tokens != settings.chunk_size_bytes / settings.bytes_per_token.max(1) {
            tracing::info!(
                chunk_size_bytes = settings.chunk_size_bytes,
                target_tokens,
                min_tokens = settings.min_tokens,
                max_tokens = settings.max_tokens,
                "Chunk token target clamped into safe range"
            );
        }

        Self {
            configured_bytes: settings.chunk_size_bytes,
            target_tokens,
            min_chunk_chars: target_tokens / 2,
            min_emit_chars: (target_tokens / 200).max(MIN_EMIT_FLOOR_CHARS),
            keep_separator: settings.keep_separator,
            max_chunks: settings.max_chunks_per_document,
        }
    }

    /// Sizing with an explicit token target, bypassing the byte conversion.
    pub fn with_target_tokens(target_tokens: usize, keep_separator: bool) -> Self {
        let target_tokens = target_tokens.max(1);
        Self {
            configured_bytes: target_tokens,
            target_tokens,
            min_chunk_chars: target_tokens / 2,
            min_emit_chars: (target_tokens / 200).max(MIN_EMIT_FLOOR_CHARS),
            keep_separator,
            max_chunks: usize::MAX,
        }
    }
}

