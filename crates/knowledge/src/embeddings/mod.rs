//! Embedding providers.
//!
//! Every provider maps text to a fixed-dimension `f32` vector. Ingestion and
//! retrieval must use the same provider and model, otherwise distances are
//! meaningless; the model identity is recorded in the chunk manifest.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{GeminiProvider, MockProvider, OllamaProvider};
