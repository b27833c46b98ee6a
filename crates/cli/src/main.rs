//! Support Bot CLI
//!
//! Main entry point for the `supportbot` command-line tool.
//! Builds the documentation index, answers questions from it, and serves the
//! HTTP endpoint.

mod api;
mod commands;
mod state;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, ServeCommand, StatsCommand};
use std::path::PathBuf;
use supportbot_core::{config::AppConfig, logging, AppResult};

/// Support Bot - documentation-grounded answers for support questions
#[derive(Parser, Debug)]
#[command(name = "supportbot")]
#[command(about = "Documentation-grounded support answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generation provider (gemini, ollama)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Generation model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk, embed and index the corpus
    Ingest(IngestCommand),

    /// Answer a question from the index
    Ask(AskCommand),

    /// Show the manifest of the stored index
    Stats(StatsCommand),

    /// Serve the HTTP endpoint
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Defaults, config file and environment, then CLI overrides
    let config = AppConfig::load_from(cli.workspace, cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Support Bot starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("LLM: {}/{}", config.llm.provider, config.llm.model);
    tracing::debug!(
        "Embedding: {}/{}",
        config.embedding.provider,
        config.embedding.model
    );

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
