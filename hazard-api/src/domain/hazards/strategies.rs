//! The three independent candidate strategies.
//!
//! Every strategy swallows its own failures: an embedder outage, a timeout or
//! a store error yields an empty candidate list and a warning, never an error.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::service::RetrievalConfig;
use super::traits::{Embedder, HazardError, HazardRepository, Result};
use super::types::{QueryContext, StructuredHazard};

/// Strategy A: vector similarity over hazard descriptions.
pub async fn semantic_matches<E, R>(
    embedder: Option<&E>,
    repository: &R,
    job_description: &str,
    config: &RetrievalConfig,
) -> Vec<StructuredHazard>
where
    E: Embedder,
    R: HazardRepository,
{
    let Some(embedder) = embedder else {
        debug!("no embedder configured, skipping semantic strategy");
        return vec![];
    };

    let result = embed_and_search(embedder, repository, job_description, config).await;

    degrade("semantic", result)
}

/// Strategy B: attribute lookup by work type, location and equipment.
pub async fn context_matches<R>(
    repository: &R,
    context: &QueryContext,
    config: &RetrievalConfig,
) -> Vec<StructuredHazard>
where
    R: HazardRepository,
{
    let result = with_timeout(
        "context query",
        config.query_timeout,
        repository.by_context(context, config.context_limit),
    )
    .await;

    degrade("context", result)
}

/// Strategy C: unconditional high-confidence hazards for the work type.
pub async fn critical_matches<R>(
    repository: &R,
    context: &QueryContext,
    config: &RetrievalConfig,
) -> Vec<StructuredHazard>
where
    R: HazardRepository,
{
    let primary_category = config
        .critical_primary_category_qualifies
        .then_some(config.weights.primary_category);

    let result = with_timeout(
        "critical query",
        config.query_timeout,
        repository.critical(
            context.work_type,
            config.critical_min_confidence,
            primary_category,
            config.critical_limit,
        ),
    )
    .await;

    degrade("critical", result)
}

async fn embed_and_search<E, R>(
    embedder: &E,
    repository: &R,
    job_description: &str,
    config: &RetrievalConfig,
) -> Result<Vec<StructuredHazard>>
where
    E: Embedder,
    R: HazardRepository,
{
    let embedding = with_timeout(
        "embedding",
        config.embedding_timeout,
        embedder.embed(job_description),
    )
    .await?;

    if embedding.is_empty() {
        debug!("embedder returned no vector, skipping semantic strategy");
        return Ok(vec![]);
    }

    let hazards = with_timeout(
        "vector search",
        config.query_timeout,
        repository.similar(&embedding, config.similarity_threshold, config.semantic_limit),
    )
    .await?;

    Ok(hazards
        .into_iter()
        .filter(|h| h.similarity.is_some())
        .collect())
}

async fn with_timeout<T>(
    operation: &'static str,
    budget: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(HazardError::Timeout {
            operation,
            millis: budget.as_millis(),
        }),
    }
}

fn degrade(strategy: &'static str, result: Result<Vec<StructuredHazard>>) -> Vec<StructuredHazard> {
    match result {
        Ok(hazards) => {
            debug!(strategy, count = hazards.len(), "strategy complete");
            hazards
        }
        Err(e) => {
            warn!(strategy, error = %e, "strategy failed, contributing no hazards");
            vec![]
        }
    }
}
