//! Trait definitions for the hazard retrieval collaborators.
//!
//! These traits enable dependency injection and easy testing through mocking.

use async_trait::async_trait;

use super::types::{HazardCategory, QueryContext, StructuredHazard, WorkType};

/// Error type for collaborator operations.
///
/// These never reach callers of the retriever; each strategy degrades to an
/// empty candidate list instead.
#[derive(Debug, thiserror::Error)]
pub enum HazardError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: &'static str, millis: u128 },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<sqlx::Error> for HazardError {
    fn from(e: sqlx::Error) -> Self {
        HazardError::DatabaseError(e.to_string())
    }
}

impl From<reqwest::Error> for HazardError {
    fn from(e: reqwest::Error) -> Self {
        HazardError::EmbeddingError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HazardError>;

/// Trait for text embedding generation.
///
/// # Example
///
/// ```ignore
/// let embedder = OpenAiEmbedder::new(api_key)?;
/// let embedding = embedder.embed("rewire kitchen ring final").await?;
/// assert_eq!(embedding.len(), 1536);
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text.
    ///
    /// An empty vector means the provider had nothing to offer.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Returns the embedding dimensions for this embedder.
    #[allow(dead_code)]
    fn dimensions(&self) -> usize;
}

/// Read-only access to the hazard knowledge base.
///
/// Implementations never write; usage counts are maintained elsewhere.
#[async_trait]
pub trait HazardRepository: Send + Sync {
    /// Vector similarity search over hazard descriptions.
    ///
    /// Returns at most `limit` hazards with similarity >= `threshold`, most
    /// similar first, each carrying its `similarity`.
    async fn similar(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>>;

    /// Attribute lookup by work type, location and equipment applicability.
    ///
    /// An axis only excludes a record when the record declares tags for it
    /// and the context supplies a value. Ordered by confidence then usage.
    async fn by_context(&self, context: &QueryContext, limit: i64)
        -> Result<Vec<StructuredHazard>>;

    /// High-confidence hazards for a work type, most confident first.
    ///
    /// When `primary_category` is set, records of that category qualify
    /// even without a work-type match.
    async fn critical(
        &self,
        work_type: WorkType,
        min_confidence: f64,
        primary_category: Option<HazardCategory>,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>>;
}
