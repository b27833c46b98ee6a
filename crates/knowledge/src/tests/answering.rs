//! Question answering over a stored index.

use super::{RecordingLlm, TableEmbedder};
use crate::chunker::ChunkingOptions;
use crate::embeddings::EmbeddingProvider;
use crate::ingest::ingest;
use crate::rag::{answer_question, Retriever, SYSTEM_PROMPT};
use crate::store::IndexStore;
use crate::types::AskOptions;
use std::sync::Arc;
use supportbot_core::AppError;
use tempfile::TempDir;

fn options(question: &str) -> AskOptions {
    AskOptions {
        question: question.to_string(),
        top_k: 4,
        max_sources: 2,
        model: "test-model".to_string(),
        temperature: Some(0.2),
    }
}

/// Four one-word chunks at increasing distance from the query.
async fn four_chunk_retriever(temp: &TempDir) -> Retriever {
    let store = IndexStore::new(temp.path());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TableEmbedder::new(
        1,
        &[
            ("aaaa", vec![1.0]),
            ("bbbb", vec![2.0]),
            ("cccc", vec![3.0]),
            ("dddd", vec![4.0]),
            ("eeee", vec![5.0]),
            ("reset?", vec![0.0]),
        ],
    ));

    let options = ChunkingOptions::new(5, 0).unwrap();
    ingest("eeee dddd cccc bbbb aaaa", &options, embedder.as_ref(), &store)
        .await
        .unwrap();

    Retriever::open(embedder, &store).unwrap()
}

#[tokio::test]
async fn test_answer_returns_top_sources_and_confidence() {
    let temp = TempDir::new().unwrap();
    let retriever = four_chunk_retriever(&temp).await;
    let llm = RecordingLlm::default();

    let response = answer_question(&retriever, &llm, &options("reset?"))
        .await
        .unwrap();

    assert_eq!(response.answer, "Here is what the docs say.");
    assert_eq!(response.sources, vec!["aaaa", "bbbb"]);
    // Distances 1, 4, 9, 16
    assert!((response.confidence - 1.0 / 8.5).abs() < 1e-6);

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "test-model");
    assert_eq!(calls[0].system.as_deref(), Some(SYSTEM_PROMPT));
    assert_eq!(calls[0].temperature, Some(0.2));
    assert!(calls[0].prompt.contains("- aaaa\n\n- bbbb\n\n- cccc\n\n- dddd"));
    assert!(!calls[0].prompt.contains("eeee"));
}

#[tokio::test]
async fn test_empty_question_rejected_before_generation() {
    let temp = TempDir::new().unwrap();
    let retriever = four_chunk_retriever(&temp).await;
    let llm = RecordingLlm::default();

    let err = answer_question(&retriever, &llm, &options("   "))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn test_empty_index_still_generates() {
    let temp = TempDir::new().unwrap();
    let store = IndexStore::new(temp.path());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TableEmbedder::new(1, &[]));
    ingest("", &ChunkingOptions::default(), embedder.as_ref(), &store)
        .await
        .unwrap();

    let retriever = Retriever::open(embedder, &store).unwrap();
    let llm = RecordingLlm::default();

    let response = answer_question(&retriever, &llm, &options("reset?"))
        .await
        .unwrap();

    assert!(response.sources.is_empty());
    assert_eq!(response.confidence, 0.0);
    assert_eq!(llm.calls().len(), 1);
}

#[tokio::test]
async fn test_embedding_failure_propagates() {
    let temp = TempDir::new().unwrap();
    let retriever = four_chunk_retriever(&temp).await;
    let llm = RecordingLlm::default();

    // The table has no vector for this question
    let err = answer_question(&retriever, &llm, &options("unknown question"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Embedding(_)));
    assert!(llm.calls().is_empty());
}
