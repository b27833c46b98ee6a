//! Offline embedding provider built from hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use std::collections::HashMap;
use supportbot_core::AppResult;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "with", "from", "this", "that", "have", "has",
    "had", "its", "their", "they", "them", "you", "your", "can", "not", "but",
];

/// Deterministic provider for tests and local development.
///
/// Texts sharing vocabulary land close together, unrelated texts land far
/// apart. Vectors are unit length except for texts with no usable words,
/// which map to the zero vector.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, bytes: &[u8], multiplier: u64) -> usize {
        let hash = bytes
            .iter()
            .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(*b as u64));
        (hash % self.dimensions as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vector;
        }

        let lower = text.to_lowercase();
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *counts.entry(word).or_insert(0) += 1;
        }

        for (word, count) in &counts {
            let weight = *count as f32;
            let chars: Vec<char> = word.chars().collect();

            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(trigram.as_bytes(), 37)] += weight.sqrt();
            }
            vector[self.bucket(word.as_bytes(), 31)] += weight;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn dist(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[tokio::test]
    async fn test_mock_provider_embed_batch() {
        let provider = MockProvider::new(128);
        let texts = vec![
            "reset your password".to_string(),
            "billing and invoices".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 128);
            assert!((norm(embedding) - 1.0).abs() < 1e-3);
        }
    }

    #[tokio::test]
    async fn test_mock_provider_deterministic() {
        let provider = MockProvider::new(128);

        let a = provider.embed("deterministic vectors").await.unwrap();
        let b = provider.embed("deterministic vectors").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_related_texts_are_closer() {
        let provider = MockProvider::new(256);

        let query = provider.embed("How do I reset my password?").await.unwrap();
        let related = provider
            .embed("To reset a password open Settings and choose Security.")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Invoices are emailed monthly to the billing contact.")
            .await
            .unwrap();

        assert!(dist(&query, &related) < dist(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = MockProvider::new(32);
        let embedding = provider.embed("").await.unwrap();

        assert_eq!(embedding.len(), 32);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_text() {
        let provider = MockProvider::new(64);
        let embedding = provider
            .embed("Réinitialiser le mot de passe 🎮 rápidamente")
            .await
            .unwrap();

        assert!((norm(&embedding) - 1.0).abs() < 1e-3);
    }
}
