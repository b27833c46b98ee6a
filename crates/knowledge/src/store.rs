//! Persistent index namespace: a vector artifact and a chunk artifact.
//!
//! `docs.index` holds the vectors in a small binary format:
//!
//! ```text
//! magic "SBVX" | version u32 | dimension u32 | count u64 | generation [u8; 16] | count * dimension f32
//! ```
//!
//! (all integers and floats little-endian). `chunks.json` holds the chunk
//! texts in ordinal order plus the manifest. Both artifacts carry the same
//! random generation id; a reader that observes different ids has seen a
//! half-finished re-ingestion and reports corruption instead of serving
//! mismatched text.

use crate::types::Chunk;
use crate::vector_index::{FlatL2Index, VectorIndex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use supportbot_core::{AppError, AppResult};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Vector artifact file name.
pub const INDEX_FILE: &str = "docs.index";

/// Chunk artifact file name.
pub const CHUNKS_FILE: &str = "chunks.json";

/// Current on-disk format version of both artifacts.
pub const FORMAT_VERSION: u32 = 1;

const MAGIC: &[u8; 4] = b"SBVX";
const HEADER_LEN: usize = 4 + 4 + 4 + 8 + 16;

/// How an index was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embedding_provider: String,
    pub embedding_model: String,
    /// Hex SHA-256 of the source text
    pub source_sha256: String,
}

/// Descriptive header of a stored index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub generation: Uuid,
    pub dimension: usize,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: IndexMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredChunk {
    text: String,
    start: usize,
    end: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChunksArtifact {
    #[serde(flatten)]
    manifest: IndexManifest,
    chunks: Vec<StoredChunk>,
}

/// A fully validated index pair.
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: FlatL2Index,
    pub chunks: Vec<Chunk>,
    pub manifest: IndexManifest,
}

/// Directory holding one index namespace.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn chunks_path(&self) -> PathBuf {
        self.dir.join(CHUNKS_FILE)
    }

    /// Whether both artifacts are present.
    pub fn exists(&self) -> bool {
        self.index_path().is_file() && self.chunks_path().is_file()
    }

    /// Persist an index and its chunks under a fresh generation id.
    ///
    /// Both artifacts are first written and synced to temporary files in the
    /// namespace. Only when both writes succeed are they renamed into place,
    /// so a failed save leaves the previous pair loadable.
    pub fn save(
        &self,
        index: &FlatL2Index,
        chunks: &[Chunk],
        metadata: &IndexMetadata,
    ) -> AppResult<IndexManifest> {
        if index.len() != chunks.len() {
            return Err(AppError::Corruption(format!(
                "refusing to save {} vectors with {} chunks",
                index.len(),
                chunks.len()
            )));
        }

        std::fs::create_dir_all(&self.dir)?;

        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            generation: Uuid::new_v4(),
            dimension: index.dimension(),
            chunk_count: chunks.len(),
            created_at: Utc::now(),
            metadata: metadata.clone(),
        };

        let artifact = ChunksArtifact {
            manifest: manifest.clone(),
            chunks: chunks
                .iter()
                .map(|c| StoredChunk {
                    text: c.text.clone(),
                    start: c.start,
                    end: c.end,
                })
                .collect(),
        };

        let vector_bytes = encode_index(index, manifest.generation)?;
        let chunk_bytes = serde_json::to_vec_pretty(&artifact)?;

        commit_artifacts(&[
            (self.index_path(), vector_bytes.as_slice()),
            (self.chunks_path(), chunk_bytes.as_slice()),
        ])?;

        tracing::info!(
            generation = %manifest.generation,
            chunks = manifest.chunk_count,
            dimension = manifest.dimension,
            "Saved index to {:?}",
            self.dir
        );

        Ok(manifest)
    }

    /// Load and cross-check both artifacts.
    pub fn load(&self) -> AppResult<LoadedIndex> {
        self.ensure_present()?;

        let bytes = std::fs::read(self.index_path())?;
        let (generation, index) = decode_index(&bytes)?;
        let artifact = self.read_chunks()?;
        let manifest = artifact.manifest;

        if manifest.generation != generation {
            return Err(AppError::Corruption(format!(
                "{} (generation {}) and {} (generation {}) come from different ingestions",
                INDEX_FILE, generation, CHUNKS_FILE, manifest.generation
            )));
        }

        if manifest.dimension != index.dimension() {
            return Err(AppError::Corruption(format!(
                "manifest dimension {} does not match vector dimension {}",
                manifest.dimension,
                index.dimension()
            )));
        }

        if index.len() != artifact.chunks.len() || manifest.chunk_count != artifact.chunks.len() {
            return Err(AppError::Corruption(format!(
                "{} vectors, {} chunks, manifest declares {}",
                index.len(),
                artifact.chunks.len(),
                manifest.chunk_count
            )));
        }

        let chunks = artifact
            .chunks
            .into_iter()
            .enumerate()
            .map(|(ordinal, c)| Chunk {
                ordinal,
                text: c.text,
                start: c.start,
                end: c.end,
            })
            .collect();

        tracing::debug!(
            generation = %generation,
            vectors = index.len(),
            "Loaded index from {:?}",
            self.dir
        );

        Ok(LoadedIndex {
            index,
            chunks,
            manifest,
        })
    }

    /// Read only the manifest of the stored index.
    pub fn manifest(&self) -> AppResult<IndexManifest> {
        self.ensure_present()?;
        Ok(self.read_chunks()?.manifest)
    }

    fn ensure_present(&self) -> AppResult<()> {
        for path in [self.index_path(), self.chunks_path()] {
            if !path.is_file() {
                return Err(AppError::NotFound(format!(
                    "Index artifact {:?} is missing. Run `supportbot ingest` first.",
                    path
                )));
            }
        }
        Ok(())
    }

    fn read_chunks(&self) -> AppResult<ChunksArtifact> {
        let contents = std::fs::read_to_string(self.chunks_path())?;
        let artifact: ChunksArtifact = serde_json::from_str(&contents).map_err(|e| {
            AppError::Corruption(format!("Failed to parse {}: {}", CHUNKS_FILE, e))
        })?;

        if artifact.manifest.format_version != FORMAT_VERSION {
            return Err(AppError::Corruption(format!(
                "{} has format version {}, expected {}",
                CHUNKS_FILE, artifact.manifest.format_version, FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }
}

/// Stage every artifact as a synced temp file beside its target, then rename
/// them all into place. Nothing is renamed unless every write succeeded;
/// staged files are removed on drop.
fn commit_artifacts(artifacts: &[(PathBuf, &[u8])]) -> AppResult<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for (target, bytes) in artifacts {
        staged.push((target, stage_artifact(target, bytes)?));
    }

    for (target, tmp) in staged {
        tmp.persist(target).map_err(|e| AppError::Io(e.error))?;
    }
    Ok(())
}

fn stage_artifact(target: &Path, bytes: &[u8]) -> AppResult<NamedTempFile> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

fn encode_index(index: &FlatL2Index, generation: Uuid) -> AppResult<Vec<u8>> {
    let dimension = u32::try_from(index.dimension())
        .map_err(|_| AppError::Corruption(format!("dimension {} too large", index.dimension())))?;

    let data = index.as_slice();
    let mut bytes = Vec::with_capacity(HEADER_LEN + data.len() * 4);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&dimension.to_le_bytes());
    bytes.extend_from_slice(&(index.len() as u64).to_le_bytes());
    bytes.extend_from_slice(generation.as_bytes());
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    Ok(bytes)
}

fn decode_index(bytes: &[u8]) -> AppResult<(Uuid, FlatL2Index)> {
    let corrupt = |msg: &str| AppError::Corruption(format!("{}: {}", INDEX_FILE, msg));

    if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
        return Err(corrupt("not a vector index file"));
    }

    let u32_at =
        |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    let version = u32_at(4);
    if version != FORMAT_VERSION {
        return Err(corrupt(&format!(
            "format version {}, expected {}",
            version, FORMAT_VERSION
        )));
    }

    let dimension = u32_at(8) as usize;
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&bytes[12..20]);
    let count = u64::from_le_bytes(count_bytes);

    let mut generation = [0u8; 16];
    generation.copy_from_slice(&bytes[20..HEADER_LEN]);

    let payload = &bytes[HEADER_LEN..];
    let expected = usize::try_from(count)
        .ok()
        .and_then(|c| c.checked_mul(dimension))
        .and_then(|n| n.checked_mul(4));
    if expected != Some(payload.len()) {
        return Err(corrupt(&format!(
            "header declares {} vectors of dimension {} but payload is {} bytes",
            count,
            dimension,
            payload.len()
        )));
    }

    let data = payload
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    if dimension == 0 && count != 0 {
        return Err(corrupt("vectors of dimension 0"));
    }
    let index = FlatL2Index::from_raw(dimension, data)?;

    Ok((Uuid::from_bytes(generation), index))
}
