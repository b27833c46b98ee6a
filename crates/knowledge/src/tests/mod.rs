//! End-to-end tests over the ingestion and retrieval pipeline.

mod answering;

use crate::embeddings::EmbeddingProvider;
use std::collections::HashMap;
use std::sync::Mutex;
use supportbot_core::{AppError, AppResult};
use supportbot_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};

/// Embedder with hand-picked vectors so distances are exact.
#[derive(Debug)]
pub(crate) struct TableEmbedder {
    dimensions: usize,
    table: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub(crate) fn new(dimensions: usize, entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            dimensions,
            table: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TableEmbedder {
    fn provider_name(&self) -> &str {
        "table"
    }

    fn model_name(&self) -> &str {
        "fixed"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                self.table
                    .get(text)
                    .cloned()
                    .ok_or_else(|| AppError::Embedding(format!("no vector for {:?}", text)))
            })
            .collect()
    }
}

/// Generation stub that records every request.
#[derive(Default)]
pub(crate) struct RecordingLlm {
    pub(crate) requests: Mutex<Vec<LlmRequest>>,
}

impl RecordingLlm {
    pub(crate) fn calls(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(LlmResponse {
            content: "Here is what the docs say.".to_string(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}
