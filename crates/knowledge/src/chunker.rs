//! Text chunking with configurable size and overlap.
//!
//! The text is walked in windows of `chunk_size` characters. Each window is
//! trimmed and kept if anything remains; the next window starts
//! `chunk_size - overlap` characters later (at least one character later, so
//! the walk always terminates). The window that reaches the end of the text
//! is the last one.

use crate::types::Chunk;
use supportbot_core::{AppError, AppResult};

/// Validated chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkingOptions {
    /// Build options, rejecting `chunk_size == 0` and `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between consecutive window starts.
    pub fn advance(&self) -> usize {
        advance(self.chunk_size, self.overlap)
    }

    /// Chunk `text` with these options.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        chunk_text(text, self.chunk_size, self.overlap)
    }
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 120,
        }
    }
}

fn advance(chunk_size: usize, overlap: usize) -> usize {
    chunk_size.saturating_sub(overlap).max(1)
}

/// Chunk text into overlapping windows measured in characters.
///
/// Accepts any parameters, including `overlap >= chunk_size`; the advance is
/// clamped to one character.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    // Byte offset of every char boundary, including the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;
    let step = advance(chunk_size, overlap);

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < char_count {
        let end = start.saturating_add(chunk_size).min(char_count);
        let window = &text[boundaries[start]..boundaries[end]];
        let trimmed = window.trim();

        if !trimmed.is_empty() {
            chunks.push(Chunk {
                ordinal: chunks.len(),
                text: trimmed.to_string(),
                start,
                end,
            });
        }

        if end == char_count {
            break;
        }
        start += step;
    }

    tracing::debug!(
        "Chunked {} chars into {} chunks (size: {}, overlap: {})",
        char_count,
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

/// Chunk texts only, in document order.
pub fn chunk_strings(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    chunk_text(text, chunk_size, overlap)
        .into_iter()
        .map(|chunk| chunk.text)
        .collect()
}
