//! Stats command handler.
//!
//! Shows the manifest of the stored index.

use clap::Args;
use supportbot_core::{config::AppConfig, AppResult};
use supportbot_knowledge::index_stats;

/// Show the manifest of the stored index
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let manifest = index_stats(config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            return Ok(());
        }

        println!("Index: {:?}", config.index_dir());
        println!("  Chunks: {}", manifest.chunk_count);
        println!("  Dimension: {}", manifest.dimension);
        println!(
            "  Embedding: {}/{}",
            manifest.metadata.embedding_provider, manifest.metadata.embedding_model
        );
        println!(
            "  Chunking: size {}, overlap {}",
            manifest.metadata.chunk_size, manifest.metadata.chunk_overlap
        );
        println!("  Source SHA-256: {}", manifest.metadata.source_sha256);
        println!("  Generation: {}", manifest.generation);
        println!("  Created: {}", manifest.created_at.to_rfc3339());

        Ok(())
    }
}
