//! Ingest command handler.
//!
//! Rebuilds the index namespace from the corpus.

use clap::Args;
use std::path::PathBuf;
use supportbot_core::{config::AppConfig, AppResult};
use supportbot_knowledge::{ingest_corpus, ChunkingOptions};

/// Chunk, embed and index the corpus
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Corpus file or directory (default from config)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Window length in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive windows
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest options: {:?}", self);

        config.validate()?;

        let chunking = ChunkingOptions::new(
            self.chunk_size.unwrap_or(config.retrieval.chunk_size),
            self.overlap.unwrap_or(config.retrieval.chunk_overlap),
        )?;

        let stats = ingest_corpus(config, self.corpus.as_deref(), Some(chunking)).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("✓ Indexed {} chunks", stats.chunks_count);
            println!("  Dimension: {}", stats.dimension);
            println!("  Bytes processed: {}", stats.bytes_processed);
            println!("  Duration: {:.2}s", stats.duration_secs);
            println!("  Index: {:?}", config.index_dir());
        }

        Ok(())
    }
}
