//! Retrieval-augmented answering.
//!
//! [`retrieve`] turns a question into ranked chunks and a confidence score;
//! [`ask`] feeds those chunks to a language model.

pub mod ask;
pub mod retrieve;
pub mod types;

pub use ask::{answer_question, build_user_prompt, DEFAULT_MAX_SOURCES, SYSTEM_PROMPT};
pub use retrieve::{confidence, Retriever, DEFAULT_TOP_K};
pub use types::AskResponse;
