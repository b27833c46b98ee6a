//! `POST /ask` handler.

use crate::api::error::reject;
use crate::state::AppState;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use warp::{Rejection, Reply};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn handle_ask(request: AskRequest, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    state
        .authorize(request.password.as_deref())
        .map_err(reject)?;

    info!("Answering question ({} chars)", request.question.len());

    let response = state
        .ask(&request.question, None)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&response))
}
