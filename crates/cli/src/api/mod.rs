//! HTTP shell: `POST /ask` and `GET /health`.

use crate::state::AppState;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

mod ask;
pub mod error;

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 64 * 1024;

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "ok"})));

    let ask_route = warp::path("ask")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(ask::handle_ask);

    health
        .or(ask_route)
        .recover(error::handle_rejection)
        .with(cors())
        .with(warp::log("supportbot::api"))
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["Content-Type", "Accept", "Authorization", "Origin"])
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use supportbot_core::{AppConfig, AppResult};
    use supportbot_knowledge::embeddings::MockProvider;
    use supportbot_knowledge::{ingest, ChunkingOptions, EmbeddingProvider, IndexStore};
    use supportbot_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
    use tempfile::TempDir;

    struct CannedLlm;

    #[async_trait::async_trait]
    impl LlmClient for CannedLlm {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(LlmResponse {
                content: "Open Settings, then Security.".to_string(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn state(temp: &TempDir, demo_password: Option<&str>) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.workspace = temp.path().to_path_buf();
        config.embedding.provider = "mock".to_string();
        config.demo_password = demo_password.map(str::to_string);

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(32));
        Arc::new(AppState::new(config, embedder, Arc::new(CannedLlm)))
    }

    async fn ingest_docs(state: &AppState) {
        let text = "Reset your password from Settings > Security. ".repeat(10)
            + &"Invoices are emailed monthly. ".repeat(10);
        ingest(
            &text,
            &ChunkingOptions::new(100, 20).unwrap(),
            state.embedder.as_ref(),
            &IndexStore::new(state.config.index_dir()),
        )
        .await
        .unwrap();
    }

    fn body_json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let temp = TempDir::new().unwrap();
        let res = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&routes(state(&temp, None)))
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(body_json(res.body())["status"], "ok");
    }

    #[tokio::test]
    async fn test_ask_returns_answer_sources_and_confidence() {
        let temp = TempDir::new().unwrap();
        let state = state(&temp, None);
        ingest_docs(&state).await;

        let res = warp::test::request()
            .method("POST")
            .path("/ask")
            .json(&serde_json::json!({"question": "How do I reset my password?"}))
            .reply(&routes(state))
            .await;

        assert_eq!(res.status(), 200);
        let body = body_json(res.body());
        assert_eq!(body["answer"], "Open Settings, then Security.");
        assert_eq!(body["sources"].as_array().unwrap().len(), 2);
        let confidence = body["confidence"].as_f64().unwrap();
        assert!(confidence > 0.0 && confidence <= 1.0);
    }

    #[tokio::test]
    async fn test_missing_index_is_service_unavailable() {
        let temp = TempDir::new().unwrap();

        let res = warp::test::request()
            .method("POST")
            .path("/ask")
            .json(&serde_json::json!({"question": "Anything?"}))
            .reply(&routes(state(&temp, None)))
            .await;

        assert_eq!(res.status(), 503);
        assert!(body_json(res.body())["details"]
            .as_str()
            .unwrap()
            .contains("missing"));
    }

    #[tokio::test]
    async fn test_demo_password_gate() {
        let temp = TempDir::new().unwrap();
        let state = state(&temp, Some("letmein"));
        ingest_docs(&state).await;
        let routes = routes(state);

        let denied = warp::test::request()
            .method("POST")
            .path("/ask")
            .json(&serde_json::json!({"question": "Reset?", "password": "wrong"}))
            .reply(&routes)
            .await;
        assert_eq!(denied.status(), 401);

        let missing = warp::test::request()
            .method("POST")
            .path("/ask")
            .json(&serde_json::json!({"question": "Reset?"}))
            .reply(&routes)
            .await;
        assert_eq!(missing.status(), 401);

        let allowed = warp::test::request()
            .method("POST")
            .path("/ask")
            .json(&serde_json::json!({"question": "Reset?", "password": "letmein"}))
            .reply(&routes)
            .await;
        assert_eq!(allowed.status(), 200);
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let temp = TempDir::new().unwrap();
        let state = state(&temp, None);
        ingest_docs(&state).await;
        let routes = routes(state);

        let empty = warp::test::request()
            .method("POST")
            .path("/ask")
            .json(&serde_json::json!({"question": "  "}))
            .reply(&routes)
            .await;
        assert_eq!(empty.status(), 400);

        let malformed = warp::test::request()
            .method("POST")
            .path("/ask")
            .header("content-type", "application/json")
            .body("{\"query\": 1}")
            .reply(&routes)
            .await;
        assert_eq!(malformed.status(), 400);
    }
}
