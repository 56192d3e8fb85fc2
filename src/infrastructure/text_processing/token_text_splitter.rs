use std::ops::Range;

use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::application::services::count_tokens;
use crate::domain::TextChunk;

use super::ChunkSizing;

/// Upper bound on bytes examined per token when sizing a window.
const MAX_BYTES_PER_TOKEN: usize = 16;

const SEPARATORS: [char; 4] = ['.', '!', '?', '\n'];

/// Splits segments into windows of at most `target_tokens` tokens, backing
/// off to the last sentence or line break when that keeps enough text.
///
/// Each segment is split on its own, so a chunk never spans two pages.
pub struct TokenTextSplitter {
    sizing: ChunkSizing,
}

impl TokenTextSplitter {
    pub fn new(sizing: ChunkSizing) -> Self {
        Self { sizing }
    }

    pub fn sizing(&self) -> &ChunkSizing {
        &self.sizing
    }

    fn split_all(&self, segments: &[String]) -> Result<Vec<(usize, String)>, TextSplitterError> {
        let mut pieces: Vec<(usize, String)> = Vec::new();

        for (segment_index, segment) in segments.iter().enumerate() {
            if segment.trim().is_empty() {
                continue;
            }
            for text in self.split_segment(segment) {
                pieces.push((segment_index, text));
                if pieces.len() > self.sizing.max_chunks {
                    return Err(TextSplitterError::TooManyChunks {
                        produced: pieces.len(),
                        max: self.sizing.max_chunks,
                    });
                }
            }
        }

        Ok(pieces)
    }

    fn split_segment(&self, segment: &str) -> Vec<String> {
        let mut ranges: Vec<Range<usize>> = Vec::new();
        let mut start = 0;

        while start < segment.len() {
            let rest = &segment[start..];
            let window = self.window_len(rest);
            let mut cut = start + window;

            if cut < segment.len() && self.sizing.keep_separator {
                cut = start + self.separator_cut(&rest[..window]);
            }

            let piece = &segment[start..cut];
            let short = self.normalize(piece).len() < self.sizing.min_emit_chars;

            match ranges.last_mut() {
                Some(previous) if short => previous.end = cut,
                _ => ranges.push(start..cut),
            }

            start = cut;
        }

        ranges
            .into_iter()
            .map(|range| self.normalize(&segment[range]))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Byte length of the longest prefix of `rest` within the token target.
    fn window_len(&self, rest: &str) -> usize {
        let target = self.sizing.target_tokens;
        let cap = floor_char_boundary(
            rest,
            rest.len().min(target.saturating_mul(MAX_BYTES_PER_TOKEN)),
        );

        if count_tokens(&rest[..cap]) <= target {
            return cap;
        }

        let boundaries: Vec<usize> = rest[..cap]
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .collect();

        let mut best = boundaries[0];
        let mut low = 0;
        let mut high = boundaries.len() - 1;

        while low <= high {
            let mid = (low + high) / 2;
            if count_tokens(&rest[..boundaries[mid]]) <= target {
                best = boundaries[mid];
                low = mid + 1;
            } else if mid == 0 {
                break;
            } else {
                high = mid - 1;
            }
        }

        best
    }

    /// End of the window after its last separator, or the whole window when
    /// backing off would leave fewer than `min_chunk_chars` bytes.
    fn separator_cut(&self, window: &str) -> usize {
        match window.rfind(SEPARATORS) {
            Some(pos) if pos + 1 > self.sizing.min_chunk_chars => pos + 1,
            _ => window.len(),
        }
    }

    fn normalize(&self, piece: &str) -> String {
        if self.sizing.keep_separator {
            piece.trim().to_string()
        } else {
            piece.replace(['\r', '\n'], " ").trim().to_string()
        }
    }
}

#[async_trait]
impl TextSplitter for TokenTextSplitter {
    async fn split(&self, segments: &[String]) -> Result<Vec<TextChunk>, TextSplitterError> {
        let splitter = TokenTextSplitter::new(self.sizing);
        let owned = segments.to_vec();

        // Token counting is CPU-bound; keep it off the async workers.
        let pieces = tokio::task::spawn_blocking(move || splitter.split_all(&owned))
            .await
            .map_err(|e| TextSplitterError::SplittingFailed(format!("task join error: {e}")))??;

        let total = pieces.len();
        tracing::debug!(
            segments = segments.len(),
            chunks = total,
            target_tokens = self.sizing.target_tokens,
            "Text split into chunks"
        );

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(index, (segment, text))| TextChunk::new(index, total, segment, text))
            .collect())
    }

    fn target_tokens(&self) -> usize {
        self.sizing.target_tokens
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
