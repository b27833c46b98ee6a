//! Offline ingestion: corpus text to a persisted index namespace.

use crate::chunker::ChunkingOptions;
use crate::embeddings::EmbeddingProvider;
use crate::store::{IndexMetadata, IndexStore};
use crate::types::IngestStats;
use crate::vector_index::{FlatL2Index, VectorIndex};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Instant;
use supportbot_core::{AppError, AppResult};
use walkdir::WalkDir;

/// File extensions picked up when the corpus is a directory.
pub const CORPUS_EXTENSIONS: &[&str] = &["txt", "md"];

/// Read the corpus text.
///
/// A file is read as-is. A directory contributes every `.txt` and `.md` file
/// below it, in sorted path order, joined by blank lines. Symlinks are
/// followed; any entry that cannot be read fails the whole read.
pub fn read_corpus(path: &Path) -> AppResult<String> {
    if path.is_file() {
        return Ok(std::fs::read_to_string(path)?);
    }

    if !path.is_dir() {
        return Err(AppError::NotFound(format!("Corpus not found: {:?}", path)));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|e| AppError::Io(e.into()))?;
        if entry.file_type().is_file() && is_corpus_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    tracing::debug!("Found {} corpus files under {:?}", files.len(), path);

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        parts.push(std::fs::read_to_string(file)?);
    }
    Ok(parts.join("\n\n"))
}

fn is_corpus_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CORPUS_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Chunk, embed, index and persist `source_text`.
///
/// The whole corpus is re-embedded on every run. Both artifacts are replaced
/// only after every chunk has been embedded successfully, so a failed run
/// leaves the previous index untouched.
pub async fn ingest(
    source_text: &str,
    options: &ChunkingOptions,
    embedder: &dyn EmbeddingProvider,
    store: &IndexStore,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    let chunks = options.chunk(source_text);
    let dimension = embedder.dimensions();

    tracing::info!(
        chunks = chunks.len(),
        provider = embedder.provider_name(),
        model = embedder.model_name(),
        "Embedding corpus"
    );

    let vectors = if chunks.is_empty() {
        Vec::new()
    } else {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        embedder.embed_batch(&texts).await?
    };

    if vectors.len() != chunks.len() {
        return Err(AppError::Embedding(format!(
            "embedder returned {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        )));
    }

    let mut index = FlatL2Index::new(dimension);
    index.add(&vectors)?;

    let metadata = IndexMetadata {
        chunk_size: options.chunk_size(),
        chunk_overlap: options.overlap(),
        embedding_provider: embedder.provider_name().to_string(),
        embedding_model: embedder.model_name().to_string(),
        source_sha256: format!("{:x}", Sha256::digest(source_text.as_bytes())),
    };
    let manifest = store.save(&index, &chunks, &metadata)?;

    let stats = IngestStats {
        chunks_count: manifest.chunk_count,
        dimension: manifest.dimension,
        bytes_processed: source_text.len() as u64,
        duration_secs: start.elapsed().as_secs_f64(),
        generation: manifest.generation,
    };

    tracing::info!(
        "Ingested {} chunks ({} bytes) in {:.2}s",
        stats.chunks_count,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}
