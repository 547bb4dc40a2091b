//! Paragraph-aligned text chunking
//!
//! Long free-text documents are split into pieces that fit the embedding
//! budget:
//! - Paragraphs (separated by a blank line) are never split
//! - Consecutive paragraphs are packed together while they fit
//! - A paragraph longer than the budget becomes its own oversized chunk
//!
//! Lengths are counted in characters, not bytes.

use crate::config::ChunkConfig;

/// Separator between paragraphs, both for splitting and for re-joining
const PARAGRAPH_BREAK: &str = "\n\n";

/// Split `text` into paragraph-aligned chunks of at most `max_chars`
///
/// Returns an empty vector when the text holds no non-blank paragraph;
/// callers then treat the whole text as a single unit.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let separator_len = PARAGRAPH_BREAK.len();
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0;

    for paragraph in text.split(PARAGRAPH_BREAK) {
        let paragraph_chars = paragraph.chars().count();

        if buffer_chars + paragraph_chars + separator_len > max_chars {
            flush(&mut chunks, &buffer);
            buffer.clear();
            buffer_chars = 0;
        }

        buffer.push_str(paragraph);
        buffer.push_str(PARAGRAPH_BREAK);
        buffer_chars += paragraph_chars + separator_len;
    }

    flush(&mut chunks, &buffer);
    chunks
}

fn flush(chunks: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// When and how free-text inputs are chunked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub enabled: bool,
    pub max_chars: usize,
}

impl ChunkPolicy {
    /// Policy that always keeps text whole
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max_chars: crate::config::default_chunk_max_chars(),
        }
    }

    /// Chunks for `text`, or `None` if it should stay a single unit
    pub fn split(&self, text: &str) -> Option<Vec<String>> {
        if !self.enabled || text.chars().count() <= self.max_chars {
            return None;
        }

        let chunks = chunk_text(text, self.max_chars);
        if chunks.is_empty() {
            None
        } else {
            Some(chunks)
        }
    }
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self::from(&ChunkConfig::default())
    }
}

impl From<&ChunkConfig> for ChunkPolicy {
    fn from(config: &ChunkConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_chars: config.max_chars,
        }
    }
}
