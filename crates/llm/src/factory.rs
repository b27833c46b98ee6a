//! LLM provider factory.
//!
//! Resolves a provider name from configuration into a concrete client,
//! injecting the endpoint and credential.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use std::sync::Arc;
use supportbot_core::{AppError, AppResult};

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }
}

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by Gemini)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// credential is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    tracing::debug!("Creating {} client", provider_type.as_str());

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(OllamaClient::DEFAULT_BASE_URL);
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        ProviderType::Gemini => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Gemini provider requires API key".to_string())
            })?;
            let client = match endpoint {
                Some(base_url) => GeminiClient::with_base_url(api_key, base_url),
                None => GeminiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("gemini"), Some(ProviderType::Gemini));
        assert_eq!(ProviderType::parse("Google"), Some(ProviderType::Gemini));
        assert_eq!(ProviderType::parse("ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("unknown"), None);
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_gemini_requires_api_key() {
        match create_client("gemini", None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires API key")),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for Gemini without API key"),
        }
    }

    #[test]
    fn test_create_gemini_client() {
        let client = create_client("gemini", None, Some("key")).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
