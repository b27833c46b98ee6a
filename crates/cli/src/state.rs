//! Shared per-process context: configuration plus the constructed providers.

use std::sync::Arc;
use supportbot_core::{AppConfig, AppError, AppResult};
use supportbot_knowledge::{
    answer_question, embedder_from_config, open_retriever, AskOptions, AskResponse,
    EmbeddingProvider,
};
use supportbot_llm::{create_client, LlmClient};

/// Everything a question needs, built once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub llm: Arc<dyn LlmClient>,
}

impl AppState {
    /// Validate the configuration and construct both providers.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let embedder = embedder_from_config(&config)?;
        let llm = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            config.api_key.as_deref(),
        )?;

        Ok(Self::new(config, embedder, llm))
    }

    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            embedder,
            llm,
        }
    }

    /// Check the optional shared secret.
    pub fn authorize(&self, password: Option<&str>) -> AppResult<()> {
        match self.config.demo_password.as_deref() {
            Some(expected) if password != Some(expected) => Err(AppError::Unauthorized(
                "Invalid demo password".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Answer one question, loading the index fresh for this call.
    ///
    /// The load reads and decodes both artifacts, so it runs on the blocking
    /// pool rather than the request executor.
    pub async fn ask(&self, question: &str, top_k: Option<usize>) -> AppResult<AskResponse> {
        let config = self.config.clone();
        let embedder = self.embedder.clone();
        let retriever = tokio::task::spawn_blocking(move || open_retriever(&config, embedder))
            .await
            .map_err(|e| AppError::Other(format!("Index load task failed: {}", e)))??;

        let options = AskOptions {
            question: question.to_string(),
            top_k: top_k.unwrap_or(self.config.retrieval.top_k),
            max_sources: self.config.retrieval.max_sources,
            model: self.config.llm.model.clone(),
            temperature: self.config.llm.temperature,
        };

        answer_question(&retriever, self.llm.as_ref(), &options).await
    }
}
