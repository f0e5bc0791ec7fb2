//! Composition root: the only place that names the concrete adapters.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    config::{EmbeddingSettings, Settings},
    domain::{
        hazards::{
            embedder::OpenAiEmbedder, repository::PgHazardRepository, HazardRetriever,
            RetrievalConfig,
        },
        ports::inbound::HazardRetrieval,
    },
};

/// Build the embedder, or `None` when semantic matching is not configured.
pub fn create_embedder(settings: &EmbeddingSettings) -> Option<OpenAiEmbedder> {
    let Some(api_key) = settings.api_key() else {
        warn!("no embedding API key configured, semantic matching disabled");
        return None;
    };

    match OpenAiEmbedder::with_model(
        api_key,
        &settings.model,
        &settings.base_url,
        settings.dimensions,
    ) {
        Ok(embedder) => {
            info!(model = %settings.model, "embedding provider configured");
            Some(embedder)
        }
        Err(e) => {
            warn!(error = %e, "failed to build embedder, semantic matching disabled");
            None
        }
    }
}

/// Wire the retriever over Postgres and the configured embedder.
pub fn create_hazard_retrieval(
    settings: &Settings,
    pool: PgPool,
) -> Result<Arc<dyn HazardRetrieval>, config::ConfigError> {
    let config = RetrievalConfig::try_from(settings.retrieval.clone())?;
    let embedder = create_embedder(&settings.embedding);
    let repository = PgHazardRepository::new(pool);

    Ok(Arc::new(HazardRetriever::new(embedder, repository, config)))
}
