//! Command handlers for the Support Bot CLI.

pub mod ask;
pub mod ingest;
pub mod serve;
pub mod stats;

pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;
