use async_trait::async_trait;

use crate::domain::hazards::{
    Embedder, HazardReport, HazardRepository, HazardRetriever, RetrievalError, RetrievalParams,
};

/// Inbound port for hazard retrieval.
///
/// HTTP handlers depend on this trait rather than on a concrete retriever,
/// so tests can swap in a stub.
#[async_trait]
pub trait HazardRetrieval: Send + Sync + 'static {
    /// Ranked hazards for a job together with coverage statistics.
    async fn retrieve(&self, params: RetrievalParams) -> Result<HazardReport, RetrievalError>;
}

#[async_trait]
impl<E, R> HazardRetrieval for HazardRetriever<E, R>
where
    E: Embedder + 'static,
    R: HazardRepository + 'static,
{
    async fn retrieve(&self, params: RetrievalParams) -> Result<HazardReport, RetrievalError> {
        HazardRetriever::retrieve(self, params).await
    }
}
