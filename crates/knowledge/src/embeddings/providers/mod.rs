//! Concrete embedding providers.

pub mod gemini;
pub mod mock;
pub mod ollama;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
