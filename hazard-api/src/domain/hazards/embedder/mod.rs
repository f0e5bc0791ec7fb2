//! Embedding generation implementations.

mod openai;

#[cfg(test)]
pub use mock::MockEmbedder;
pub use openai::{OpenAiEmbedder, OPENAI_DIMENSIONS, OPENAI_MODEL};
