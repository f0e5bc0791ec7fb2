//! Retrieval service running the three strategies and ranking the result.

use std::time::{Duration, Instant};

use itertools::Itertools;
use tracing::{debug, info, warn};

use super::extractor::extract_context;
use super::fusion::fuse;
use super::ranker::{rank, RankingWeights};
use super::strategies::{context_matches, critical_matches, semantic_matches};
use super::traits::{Embedder, HazardRepository};
use super::types::{
    HazardReport, RetrievalError, RetrievalParams, RetrievalSummary, StructuredHazard,
};

/// Configuration for the retrieval service.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Candidates requested from the vector index
    pub semantic_limit: i64,
    /// Minimum cosine similarity for a semantic hit
    pub similarity_threshold: f64,
    pub context_limit: i64,
    pub critical_limit: i64,
    /// Critical hazards need a confidence strictly above this
    pub critical_min_confidence: f64,
    /// Let primary-category hazards qualify as critical regardless of work type
    pub critical_primary_category_qualifies: bool,
    /// Maximum number of ranked hazards returned
    pub max_results: usize,
    pub max_description_length: usize,
    pub embedding_timeout: Duration,
    pub query_timeout: Duration,
    pub weights: RankingWeights,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_limit: 15,
            similarity_threshold: 0.70,
            context_limit: 15,
            critical_limit: 5,
            critical_min_confidence: 0.8,
            critical_primary_category_qualifies: true,
            max_results: 20,
            max_description_length: 1000,
            embedding_timeout: Duration::from_secs(3),
            query_timeout: Duration::from_secs(2),
            weights: RankingWeights::default(),
        }
    }
}

/// Confidence above which a hazard counts as high-confidence in the summary.
const HIGH_CONFIDENCE: f64 = 0.7;
/// Totals at or above this give the document generator rich context.
const RICH_CONTEXT_MIN: usize = 8;
/// Totals below this are too thin to rely on.
const INSUFFICIENT_BELOW: usize = 3;

/// Hazard retrieval service.
///
/// # Type Parameters
///
/// * `E` - Embedder used by the semantic strategy; optional at runtime
/// * `R` - HazardRepository serving all three strategies
///
/// # Examples
///
/// ```ignore
/// let retriever = HazardRetriever::new(Some(embedder), repository, RetrievalConfig::default());
/// let params = RetrievalParams::new("Replace consumer unit in bathroom", WorkType::Domestic);
/// let hazards = retriever.retrieve_hazards(params).await?;
/// ```
pub struct HazardRetriever<E, R>
where
    E: Embedder,
    R: HazardRepository,
{
    embedder: Option<E>,
    repository: R,
    config: RetrievalConfig,
}

impl<E, R> HazardRetriever<E, R>
where
    E: Embedder,
    R: HazardRepository,
{
    pub fn new(embedder: Option<E>, repository: R, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            repository,
            config,
        }
    }

    pub fn with_defaults(embedder: Option<E>, repository: R) -> Self {
        Self::new(embedder, repository, RetrievalConfig::default())
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Ranked hazards for a job, highest relevance first.
    ///
    /// Backend failures never surface here: a request every strategy failed
    /// for yields `Ok(vec![])`.
    pub async fn retrieve_hazards(
        &self,
        params: RetrievalParams,
    ) -> Result<Vec<StructuredHazard>, RetrievalError> {
        Ok(self.retrieve(params).await?.hazards)
    }

    /// Ranked hazards together with coverage statistics.
    pub async fn retrieve(&self, params: RetrievalParams) -> Result<HazardReport, RetrievalError> {
        self.validate(&params)?;
        let started = Instant::now();

        let context = extract_context(&params);
        debug!(
            work_type = %context.work_type,
            location = ?context.location,
            equipment = ?context.equipment,
            phases = ?context.phases,
            "extracted query context"
        );

        let (semantic, by_context, critical) = tokio::join!(
            semantic_matches(
                self.embedder.as_ref(),
                &self.repository,
                params.job_description.trim(),
                &self.config,
            ),
            context_matches(&self.repository, &context, &self.config),
            critical_matches(&self.repository, &context, &self.config),
        );

        let (semantic_hits, context_hits, critical_hits) =
            (semantic.len(), by_context.len(), critical.len());

        let candidates = fuse(semantic, by_context, critical, &context.phases);
        let hazards = rank(
            candidates,
            &context,
            &self.config.weights,
            self.config.max_results,
        );

        let mut summary = summarize(&hazards);
        summary.semantic_hits = semantic_hits;
        summary.context_hits = context_hits;
        summary.critical_hits = critical_hits;

        if hazards.is_empty() {
            warn!(work_type = %context.work_type, "no hazards retrieved");
        } else if summary.insufficient {
            warn!(total = summary.total, "few hazards retrieved, coverage is thin");
        }

        info!(
            total = summary.total,
            semantic = semantic_hits,
            context = context_hits,
            critical = critical_hits,
            high_confidence = summary.high_confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "hazard retrieval complete"
        );

        Ok(HazardReport { hazards, summary })
    }

    /// Reject malformed requests before any backend is touched.
    pub fn validate(&self, params: &RetrievalParams) -> Result<(), RetrievalError> {
        let description = params.job_description.trim();
        if description.is_empty() {
            return Err(RetrievalError::EmptyJobDescription);
        }

        let len = description.chars().count();
        if len > self.config.max_description_length {
            return Err(RetrievalError::JobDescriptionTooLong {
                len,
                max: self.config.max_description_length,
            });
        }

        Ok(())
    }
}

/// Coverage statistics over a ranked hazard list.
///
/// Per-strategy hit counts are left at zero; the caller fills them in.
pub fn summarize(hazards: &[StructuredHazard]) -> RetrievalSummary {
    let total = hazards.len();
    if total == 0 {
        return RetrievalSummary {
            insufficient: true,
            ..Default::default()
        };
    }

    let average = |sum: f64| sum / total as f64;

    RetrievalSummary {
        total,
        high_confidence: hazards
            .iter()
            .filter(|h| h.confidence_score > HIGH_CONFIDENCE)
            .count(),
        average_confidence: average(hazards.iter().map(|h| h.confidence_score).sum()),
        average_risk_score: average(hazards.iter().map(|h| f64::from(h.risk_score)).sum()),
        categories: hazards.iter().map(|h| h.hazard_category).unique().collect(),
        has_rich_context: total >= RICH_CONTEXT_MIN,
        insufficient: total < INSUFFICIENT_BELOW,
        ..Default::default()
    }
}
