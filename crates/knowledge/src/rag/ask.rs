//! Question answering: retrieve context, then ask the language model.

use crate::rag::retrieve::Retriever;
use crate::rag::types::AskResponse;
use crate::types::AskOptions;
use supportbot_core::{AppError, AppResult};
use supportbot_llm::{LlmClient, LlmRequest};

/// Default number of snippets returned with an answer.
pub const DEFAULT_MAX_SOURCES: usize = 2;

/// Fixed instruction sent as the system prompt of every generation call.
pub const SYSTEM_PROMPT: &str = "\
You are a support engineer answering customer questions about a software product.

Rules:
- Use only the documentation excerpts supplied with the question.
- If the excerpts do not contain the answer, reply: \"I don't have that information in the documentation yet.\"
- Keep the answer short, practical and polite.

Formatting:
- Open with one short friendly sentence.
- When the answer involves steps, list each step on its own line starting with \"- \".
- Never use \"*\" for bullets.
- Close with: \"Let me know if you want help with anything else.\"";

/// Build the user prompt: the excerpts as a bulleted list, then the question.
pub fn build_user_prompt(question: &str, context: &[String]) -> String {
    let excerpts = context
        .iter()
        .map(|text| format!("- {}", text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Answer the customer using the documentation excerpts below.\n\n\
         DOCUMENTATION:\n{}\n\n\
         QUESTION:\n{}\n\n\
         Answer clearly and concisely. If the excerpts do not cover it, say you don't know.",
        excerpts, question
    )
}

/// Answer a question from the indexed documentation.
///
/// The model is called even when nothing was retrieved; the system prompt
/// tells it to admit the gap.
pub async fn answer_question(
    retriever: &Retriever,
    llm: &dyn LlmClient,
    options: &AskOptions,
) -> AppResult<AskResponse> {
    let question = options.question.trim();
    if question.is_empty() {
        return Err(AppError::InvalidInput("question must not be empty".to_string()));
    }

    let retrieval = retriever.retrieve(question, options.top_k).await?;
    let context = retrieval.texts();

    tracing::debug!(
        "Generating answer with {} (model: {}, context chunks: {})",
        llm.provider_name(),
        options.model,
        context.len()
    );

    let mut request = LlmRequest::new(build_user_prompt(question, &context), &options.model)
        .with_system(SYSTEM_PROMPT);
    if let Some(temperature) = options.temperature {
        request = request.with_temperature(temperature);
    }

    let response = llm.complete(&request).await?;

    let sources = context.into_iter().take(options.max_sources).collect();

    Ok(AskResponse {
        answer: response.content,
        sources,
        confidence: retrieval.confidence,
    })
}
