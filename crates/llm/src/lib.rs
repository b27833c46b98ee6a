//! Answer generation for Support Bot.
//!
//! This crate provides the provider-agnostic Generator capability: a single
//! trait, [`LlmClient`], that turns a system instruction plus a user prompt
//! into one answer string. The retrieval core depends only on the trait, so
//! tests can substitute a deterministic fake.
//!
//! # Providers
//! - **Gemini**: hosted `generateContent` API (default, needs an API key)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use supportbot_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("How do I reset my password?", "llama3.2")
//!     .with_system("Answer only from the provided context.");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, ProviderType};
pub use providers::{GeminiClient, OllamaClient};
