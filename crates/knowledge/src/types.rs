//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// A contiguous passage of the corpus.
///
/// `ordinal` is the chunk's position in document order and doubles as the
/// identifier of its vector in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in document order (dense, starting at 0)
    pub ordinal: usize,

    /// Trimmed window text, never empty
    pub text: String,

    /// First character (Unicode scalar) of the window in the source
    pub start: usize,

    /// One past the last character of the window in the source
    pub end: usize,
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of chunks embedded and indexed
    pub chunks_count: usize,

    /// Embedding dimension of the index
    pub dimension: usize,

    /// Size of the source text in bytes
    pub bytes_processed: u64,

    /// Wall-clock duration in seconds
    pub duration_secs: f64,

    /// Generation id written to both artifacts
    pub generation: uuid::Uuid,
}

/// One chunk returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Ordinal of the chunk in the index
    pub ordinal: usize,

    /// Chunk text
    pub text: String,

    /// Squared Euclidean distance to the query vector
    pub distance: f32,
}

/// Result of the retrieval pipeline for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    /// Hits ordered by ascending distance, at most k entries
    pub hits: Vec<RetrievedChunk>,

    /// Heuristic score in [0, 1], see [`crate::rag::confidence`]
    pub confidence: f64,
}

impl Retrieval {
    /// A result with no hits and zero confidence.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            confidence: 0.0,
        }
    }

    /// Chunk texts in rank order.
    pub fn texts(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.text.clone()).collect()
    }

    /// Distances in rank order.
    pub fn distances(&self) -> Vec<f32> {
        self.hits.iter().map(|hit| hit.distance).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Options for answering one question.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// The user's question
    pub question: String,

    /// Number of chunks to retrieve
    pub top_k: usize,

    /// Number of supporting snippets to return
    pub max_sources: usize,

    /// Generation model identifier
    pub model: String,

    /// Sampling temperature for the generation call
    pub temperature: Option<f32>,
}
