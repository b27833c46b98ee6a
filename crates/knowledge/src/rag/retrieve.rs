//! Query-time retrieval: embed the question, search the index, score.

use crate::embeddings::EmbeddingProvider;
use crate::store::{IndexManifest, IndexStore, LoadedIndex};
use crate::types::{Retrieval, RetrievedChunk};
use crate::vector_index::VectorIndex;
use std::sync::Arc;
use supportbot_core::{AppError, AppResult};

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Map distances to a score in `[0, 1]`: `1 / (1 + mean(distances))`.
///
/// This is a heuristic, not a calibrated probability. An empty slice scores
/// 0, as does a non-finite mean.
pub fn confidence(distances: &[f32]) -> f64 {
    if distances.is_empty() {
        return 0.0;
    }

    let mean = distances.iter().map(|d| f64::from(*d)).sum::<f64>() / distances.len() as f64;
    let score = 1.0 / (1.0 + mean);
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Read-only view over one loaded index, paired with the query embedder.
#[derive(Debug)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    loaded: LoadedIndex,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, loaded: LoadedIndex) -> Self {
        Self { embedder, loaded }
    }

    /// Load the index pair from `store`.
    pub fn open(embedder: Arc<dyn EmbeddingProvider>, store: &IndexStore) -> AppResult<Self> {
        let loaded = store.load()?;

        let built_with = &loaded.manifest.metadata;
        if built_with.embedding_provider != embedder.provider_name()
            || built_with.embedding_model != embedder.model_name()
        {
            tracing::warn!(
                "Index was built with {}/{} but queries use {}/{}",
                built_with.embedding_provider,
                built_with.embedding_model,
                embedder.provider_name(),
                embedder.model_name()
            );
        }

        Ok(Self::new(embedder, loaded))
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.loaded.manifest
    }

    pub fn len(&self) -> usize {
        self.loaded.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.chunks.is_empty()
    }

    /// Retrieve the `min(k, len)` chunks nearest to `query`.
    pub async fn retrieve(&self, query: &str, k: usize) -> AppResult<Retrieval> {
        let index = &self.loaded.index;
        if k == 0 || index.is_empty() {
            tracing::debug!("Nothing to retrieve (k: {}, indexed: {})", k, index.len());
            return Ok(Retrieval::empty());
        }

        let query_vector = self.embedder.embed(query).await?;
        if query_vector.len() != index.dimension() {
            return Err(AppError::Corruption(format!(
                "query embedding has dimension {} but the index has {}",
                query_vector.len(),
                index.dimension()
            )));
        }

        let found = index.search(&query_vector, k)?;

        let mut hits = Vec::with_capacity(found.len());
        for (ordinal, distance) in found.ordinals.iter().zip(&found.distances) {
            match self.loaded.chunks.get(*ordinal) {
                Some(chunk) => hits.push(RetrievedChunk {
                    ordinal: *ordinal,
                    text: chunk.text.clone(),
                    distance: *distance,
                }),
                None => tracing::warn!("Dropping hit with unknown ordinal {}", ordinal),
            }
        }

        let distances: Vec<f32> = hits.iter().map(|h| h.distance).collect();
        let confidence = confidence(&distances);

        tracing::info!(
            "Retrieved {} chunks (confidence: {:.3})",
            hits.len(),
            confidence
        );

        Ok(Retrieval { hits, confidence })
    }
}
