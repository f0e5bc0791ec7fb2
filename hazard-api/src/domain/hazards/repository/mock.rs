//! Mock repository implementation for testing.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::domain::hazards::traits::{HazardError, HazardRepository, Result};
use crate::domain::hazards::types::{
    HazardCategory, HazardId, QueryContext, StructuredHazard, WorkType,
};

/// Mock hazard repository backed by an in-memory HashMap.
///
/// Hazards may carry an embedding; `similar` scores them by cosine similarity.
///
/// # Examples
///
/// ```ignore
/// let repo = MockHazardRepository::new().with_hazards(vec![shock, burns]);
/// let repo = MockHazardRepository::new().failing();
/// ```
#[derive(Clone, Default)]
pub struct MockHazardRepository {
    hazards: Arc<RwLock<HashMap<HazardId, (StructuredHazard, Option<Vec<f32>>)>>>,
    /// Hazards returned by `similar` regardless of embeddings
    similar_override: Arc<RwLock<Option<Vec<StructuredHazard>>>>,
    failing: bool,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockHazardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add hazards without embeddings.
    pub fn with_hazards(self, hazards: Vec<StructuredHazard>) -> Self {
        {
            let mut stored = self.hazards.write().unwrap();
            for hazard in hazards {
                stored.insert(hazard.id.clone(), (hazard, None));
            }
        }
        self
    }

    /// Add a hazard together with its description embedding.
    pub fn with_embedded_hazard(self, hazard: StructuredHazard, embedding: Vec<f32>) -> Self {
        self.hazards
            .write()
            .unwrap()
            .insert(hazard.id.clone(), (hazard, Some(embedding)));
        self
    }

    /// Configure the exact results `similar` returns.
    pub fn with_similar_results(self, results: Vec<StructuredHazard>) -> Self {
        *self.similar_override.write().unwrap() = Some(results);
        self
    }

    /// Make every query fail with a database error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Delay every query, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of queries issued against this repository.
    pub fn call_count(&self) -> usize {
        self.call_count.load(AtomicOrdering::SeqCst)
    }

    async fn enter(&self) -> Result<()> {
        self.call_count.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(HazardError::DatabaseError("connection refused".into()));
        }
        Ok(())
    }

    fn all(&self) -> Vec<(StructuredHazard, Option<Vec<f32>>)> {
        self.hazards.read().unwrap().values().cloned().collect()
    }
}

/// An axis only excludes a hazard when it declares tags and the query has a value.
fn axis_allows(declared: &[String], wanted: &[&str]) -> bool {
    declared.is_empty()
        || wanted.is_empty()
        || wanted
            .iter()
            .any(|w| declared.iter().any(|d| d.eq_ignore_ascii_case(w)))
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn take_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

fn by_confidence_then_usage(a: &StructuredHazard, b: &StructuredHazard) -> Ordering {
    b.confidence_score
        .total_cmp(&a.confidence_score)
        .then(b.usage_count.cmp(&a.usage_count))
        .then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

#[async_trait]
impl HazardRepository for MockHazardRepository {
    async fn similar(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>> {
        self.enter().await?;

        if let Some(results) = self.similar_override.read().unwrap().as_ref() {
            return Ok(results.iter().take(take_limit(limit)).cloned().collect());
        }

        let mut results: Vec<StructuredHazard> = self
            .all()
            .into_iter()
            .filter_map(|(mut hazard, stored)| {
                let similarity = cosine_similarity(embedding, stored.as_deref()?);
                (similarity >= threshold).then(|| {
                    hazard.similarity = Some(similarity);
                    hazard
                })
            })
            .collect();

        results.sort_by(|a, b| {
            let (sa, sb) = (a.similarity.unwrap_or(0.0), b.similarity.unwrap_or(0.0));
            sb.total_cmp(&sa)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });

        Ok(results.into_iter().take(take_limit(limit)).collect())
    }

    async fn by_context(
        &self,
        context: &QueryContext,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>> {
        self.enter().await?;

        let work_type = context.work_type.tag();
        let location: Vec<&str> = context.location.as_deref().into_iter().collect();
        let equipment: Vec<&str> = context.equipment.iter().map(String::as_str).collect();

        let mut results: Vec<StructuredHazard> = self
            .all()
            .into_iter()
            .map(|(hazard, _)| hazard)
            .filter(|h| {
                axis_allows(&h.applies_to_work_types, &[work_type.as_str()])
                    && axis_allows(&h.applies_to_locations, &location)
                    && axis_allows(&h.applies_to_equipment, &equipment)
            })
            .collect();

        results.sort_by(by_confidence_then_usage);
        Ok(results.into_iter().take(take_limit(limit)).collect())
    }

    async fn critical(
        &self,
        work_type: WorkType,
        min_confidence: f64,
        primary_category: Option<HazardCategory>,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>> {
        self.enter().await?;

        let mut results: Vec<StructuredHazard> = self
            .all()
            .into_iter()
            .map(|(hazard, _)| hazard)
            .filter(|h| h.confidence_score > min_confidence)
            .filter(|h| {
                h.applies_to_work_types.is_empty()
                    || h.applies_to_work_type(work_type)
                    || primary_category == Some(h.hazard_category)
            })
            .collect();

        results.sort_by(by_confidence_then_usage);
        Ok(results.into_iter().take(take_limit(limit)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hazards::test_support::hazard;

    fn context(location: Option<&str>, equipment: &[&str]) -> QueryContext {
        QueryContext {
            work_type: WorkType::Domestic,
            location: location.map(str::to_string),
            equipment: equipment.iter().map(|e| e.to_string()).collect(),
            phases: vec![],
        }
    }

    #[tokio::test]
    async fn similar_filters_by_threshold() {
        let repo = MockHazardRepository::new()
            .with_embedded_hazard(hazard("close"), vec![1.0, 0.1, 0.0])
            .with_embedded_hazard(hazard("far"), vec![0.0, 1.0, 0.0])
            .with_hazards(vec![hazard("unembedded")]);

        let results = repo.similar(&[1.0, 0.0, 0.0], 0.7, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id.as_str(), "close");
        assert!(results[0].similarity.unwrap() > 0.99);
    }

    #[tokio::test]
    async fn by_context_keeps_undeclared_axes() {
        let mut kitchen_only = hazard("kitchen");
        kitchen_only.applies_to_locations = vec!["kitchen".to_string()];
        let mut bathroom = hazard("bathroom");
        bathroom.applies_to_locations = vec!["bathroom".to_string()];
        let anywhere = hazard("anywhere");

        let repo =
            MockHazardRepository::new().with_hazards(vec![kitchen_only, bathroom, anywhere]);

        let results = repo
            .by_context(&context(Some("bathroom"), &[]), 10)
            .await
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"bathroom"));
        assert!(ids.contains(&"anywhere"));
    }

    #[tokio::test]
    async fn by_context_equipment_axis() {
        let mut charger = hazard("charger");
        charger.applies_to_equipment = vec!["ev_charger".to_string()];
        let mut wet_room = hazard("wet_room");
        wet_room.applies_to_equipment = vec!["shower".to_string(), "cooker".to_string()];
        let anything = hazard("anything");

        let repo =
            MockHazardRepository::new().with_hazards(vec![charger, wet_room, anything]);

        let results = repo
            .by_context(&context(None, &["shower"]), 10)
            .await
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"wet_room"));
        assert!(ids.contains(&"anything"));

        let unfiltered = repo.by_context(&context(None, &[]), 10).await.unwrap();
        assert_eq!(unfiltered.len(), 3);
    }

    #[tokio::test]
    async fn by_context_ignores_stored_tag_case() {
        let mut bathroom = hazard("bathroom");
        bathroom.applies_to_locations = vec!["Bathroom".to_string()];
        bathroom.applies_to_work_types = vec!["Domestic".to_string()];

        let repo = MockHazardRepository::new().with_hazards(vec![bathroom]);

        let results = repo
            .by_context(&context(Some("bathroom"), &[]), 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn non_positive_limit_returns_nothing() {
        let repo = MockHazardRepository::new().with_hazards(vec![hazard("a")]);
        assert!(repo.by_context(&context(None, &[]), -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn nan_confidence_does_not_break_ordering() {
        let mut broken = hazard("broken");
        broken.confidence_score = f64::NAN;
        let mut solid = hazard("solid");
        solid.confidence_score = 0.9;

        let repo = MockHazardRepository::new().with_hazards(vec![broken, solid]);
        let results = repo.by_context(&context(None, &[]), 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn by_context_orders_by_confidence_then_usage() {
        let mut a = hazard("a");
        a.confidence_score = 0.5;
        a.usage_count = 100;
        let mut b = hazard("b");
        b.confidence_score = 0.9;
        b.usage_count = 1;
        let mut c = hazard("c");
        c.confidence_score = 0.9;
        c.usage_count = 7;

        let repo = MockHazardRepository::new().with_hazards(vec![a, b, c]);
        let results = repo.by_context(&context(None, &[]), 10).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn critical_requires_confidence_and_work_type() {
        let mut industrial = hazard("industrial");
        industrial.confidence_score = 0.95;
        industrial.applies_to_work_types = vec!["industrial".to_string()];
        industrial.hazard_category = HazardCategory::Mechanical;
        let mut low = hazard("low");
        low.confidence_score = 0.6;

        let repo = MockHazardRepository::new().with_hazards(vec![industrial, low]);

        let domestic = repo
            .critical(WorkType::Domestic, 0.8, None, 5)
            .await
            .unwrap();
        assert!(domestic.is_empty());

        let matched = repo
            .critical(WorkType::Industrial, 0.8, None, 5)
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[tokio::test]
    async fn critical_primary_category_qualifies_independently() {
        let mut shock = hazard("shock");
        shock.confidence_score = 0.9;
        shock.applies_to_work_types = vec!["commercial".to_string()];

        let repo = MockHazardRepository::new().with_hazards(vec![shock]);

        let without = repo
            .critical(WorkType::Domestic, 0.8, None, 5)
            .await
            .unwrap();
        assert!(without.is_empty());

        let with = repo
            .critical(WorkType::Domestic, 0.8, Some(HazardCategory::Electrical), 5)
            .await
            .unwrap();
        assert_eq!(with.len(), 1);
    }

    #[tokio::test]
    async fn failing_repository_errors() {
        let repo = MockHazardRepository::new().failing();
        assert!(repo.by_context(&context(None, &[]), 5).await.is_err());
        assert_eq!(repo.call_count(), 1);
    }
}
