//! Ask command handler.
//!
//! Answers one question from the stored index.

use crate::state::AppState;
use clap::Args;
use supportbot_core::{config::AppConfig, AppResult};

/// Answer a question from the index
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of chunks to retrieve (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let state = AppState::from_config(config.clone())?;
        let response = state.ask(&self.question, self.top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", response.answer);
            if !response.sources.is_empty() {
                println!("\nSources:");
                for (i, source) in response.sources.iter().enumerate() {
                    println!("  [{}] {}", i + 1, preview(source, 160));
                }
            }
            println!("\nConfidence: {:.2}", response.confidence);
        }

        Ok(())
    }
}

/// First `max_chars` characters of `text` on one line.
fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
