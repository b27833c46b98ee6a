//! Answer types returned to callers.

use serde::{Deserialize, Serialize};

/// Answer to one support question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    /// Text produced by the generation model
    pub answer: String,

    /// Leading retrieved chunk texts, in rank order
    pub sources: Vec<String>,

    /// Retrieval confidence in [0, 1]
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let response = AskResponse {
            answer: "Open Settings.".to_string(),
            sources: vec!["Settings has a Security tab.".to_string()],
            confidence: 0.5,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "answer": "Open Settings.",
                "sources": ["Settings has a Security tab."],
                "confidence": 0.5
            })
        );
    }
}
