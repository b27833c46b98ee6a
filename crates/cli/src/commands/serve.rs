//! Serve command handler.
//!
//! Runs the HTTP endpoint until the process is stopped.

use crate::api;
use crate::state::AppState;
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;
use supportbot_core::{config::AppConfig, AppError, AppResult};

/// Serve the HTTP endpoint
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Socket address to listen on (default from config)
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let state = Arc::new(AppState::from_config(config)?);
        if state.config.demo_password.is_some() {
            tracing::info!("Shared-secret check enabled");
        }

        tracing::info!("Server listening on {}", addr);
        warp::serve(api::routes(state)).run(addr).await;

        Ok(())
    }
}
