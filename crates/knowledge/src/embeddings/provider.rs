//! Embedding provider trait and factory.

use std::sync::Arc;
use std::time::Duration;
use supportbot_core::config::EmbeddingSettings;
use supportbot_core::{AppError, AppResult};

use super::providers::{GeminiProvider, MockProvider, OllamaProvider};

/// Trait for embedding providers.
///
/// `embed_batch` returns one vector per input text, in input order. Providers
/// never retry; a failed request surfaces as [`AppError::Embedding`].
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "gemini", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Declared embedding dimension D
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let timeout = Duration::from_secs(settings.timeout_secs);

    match settings.provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockProvider::new(settings.dimensions))),

        "ollama" => {
            let base_url = settings
                .endpoint
                .as_deref()
                .unwrap_or(OllamaProvider::DEFAULT_BASE_URL);
            let provider =
                OllamaProvider::new(base_url, &settings.model, settings.dimensions, timeout)?;
            Ok(Arc::new(provider))
        }

        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(
                    "Gemini embeddings require an API key. Set API_KEY or SUPPORTBOT_API_KEY."
                        .to_string(),
                )
            })?;
            let base_url = settings
                .endpoint
                .as_deref()
                .unwrap_or(GeminiProvider::DEFAULT_BASE_URL);
            let provider = GeminiProvider::new(
                base_url,
                api_key,
                &settings.model,
                settings.dimensions,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: gemini, ollama, mock",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            dimensions: 64,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider(&settings("mock"), None).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 64);
    }

    #[test]
    fn test_create_gemini_requires_key() {
        let err = create_provider(&settings("gemini"), None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let provider = create_provider(&settings("gemini"), Some("key")).unwrap();
        assert_eq!(provider.provider_name(), "gemini");
        assert_eq!(provider.model_name(), "text-embedding-004");
    }

    #[test]
    fn test_create_ollama_provider() {
        let mut settings = settings("ollama");
        settings.model = "nomic-embed-text".to_string();

        let provider = create_provider(&settings, None).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&settings("unknown"), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&settings("mock"), None).unwrap();

        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 64);
    }
}
