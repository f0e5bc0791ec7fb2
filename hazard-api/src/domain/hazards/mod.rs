//! Hazard retrieval - selects and ranks regulation hazards for a job.
//!
//! A request goes through a fixed pipeline:
//! - **Feature extraction** of work type, location, equipment and phases
//! - Three concurrent strategies: **semantic** (pgvector similarity),
//!   **context** (applicability overlap) and **critical** (high-confidence
//!   baseline for the work type)
//! - **Fusion** in canonical order with dedupe by hazard id
//! - **Ranking** by a weighted relevance score, capped at `max_results`
//!
//! # Architecture
//!
//! The backends sit behind trait abstractions for testability:
//!
//! - [`Embedder`] - Text embedding generation (OpenAI-compatible, mocks)
//! - [`HazardRepository`] - Knowledge base queries (PostgreSQL, mocks)
//!
//! A failing or slow backend only removes its own strategy's candidates; the
//! caller sees fewer hazards, never a backend error.
//!
//! # Example
//!
//! ```ignore
//! use hazard_api::domain::hazards::{HazardRetriever, RetrievalConfig, RetrievalParams, WorkType};
//! use hazard_api::domain::hazards::embedder::OpenAiEmbedder;
//! use hazard_api::domain::hazards::repository::PgHazardRepository;
//!
//! let embedder = OpenAiEmbedder::new(api_key)?;
//! let repository = PgHazardRepository::new(pool);
//! let retriever = HazardRetriever::new(Some(embedder), repository, RetrievalConfig::default());
//!
//! let params = RetrievalParams::new("Install electric shower in en-suite", WorkType::Domestic);
//! let hazards = retriever.retrieve_hazards(params).await?;
//! ```

mod extractor;
mod fusion;
mod ranker;
mod service;
mod strategies;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub mod embedder;
pub mod repository;

pub use extractor::{extract_context, Equipment, Location, DEFAULT_PHASES};
pub use fusion::{fuse, link_step};
pub use ranker::{rank, relevance, RankingWeights};
pub use service::{summarize, HazardRetriever, RetrievalConfig};
pub use traits::{Embedder, HazardError, HazardRepository};
pub use types::{
    HazardCategory, HazardId, HazardReport, PpeRequirement, QueryContext, RetrievalError,
    RetrievalParams, RetrievalSummary, StructuredHazard, WorkType,
};
