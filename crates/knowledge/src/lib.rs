//! Retrieval core of the support bot.
//!
//! Turns a text corpus into an on-disk vector index (chunk, embed, persist)
//! and answers questions against it (embed, nearest-neighbour search,
//! confidence, generation).

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod rag;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::{chunk_strings, chunk_text, ChunkingOptions};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use ingest::{ingest, read_corpus};
pub use rag::{answer_question, confidence, AskResponse, Retriever};
pub use store::{IndexManifest, IndexStore, LoadedIndex};
pub use types::{AskOptions, Chunk, IngestStats, Retrieval, RetrievedChunk};
pub use vector_index::{FlatL2Index, SearchHits, VectorIndex};

use std::path::Path;
use std::sync::Arc;
use supportbot_core::{AppConfig, AppResult};

/// Embedding provider described by the configuration.
pub fn embedder_from_config(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    create_provider(&config.embedding, config.api_key.as_deref())
}

/// Rebuild the configured index namespace from a corpus.
///
/// `corpus` overrides the configured corpus path; `chunking` overrides the
/// configured chunk size and overlap.
pub async fn ingest_corpus(
    config: &AppConfig,
    corpus: Option<&Path>,
    chunking: Option<ChunkingOptions>,
) -> AppResult<IngestStats> {
    let corpus_path = match corpus {
        Some(path) => path.to_path_buf(),
        None => config.corpus_path(),
    };
    let chunking = match chunking {
        Some(options) => options,
        None => ChunkingOptions::new(
            config.retrieval.chunk_size,
            config.retrieval.chunk_overlap,
        )?,
    };

    tracing::info!("Reading corpus from {:?}", corpus_path);
    let text = read_corpus(&corpus_path)?;

    let embedder = embedder_from_config(config)?;
    let store = IndexStore::new(config.index_dir());

    ingest(&text, &chunking, embedder.as_ref(), &store).await
}

/// Load the configured index namespace for querying.
pub fn open_retriever(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> AppResult<Retriever> {
    Retriever::open(embedder, &IndexStore::new(config.index_dir()))
}

/// Manifest of the configured index namespace.
pub fn index_stats(config: &AppConfig) -> AppResult<IndexManifest> {
    IndexStore::new(config.index_dir()).manifest()
}
