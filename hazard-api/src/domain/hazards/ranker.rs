//! Composite relevance scoring.

use super::types::{HazardCategory, QueryContext, StructuredHazard};

/// Weights for the relevance formula.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingWeights {
    pub confidence: f64,
    pub usage: f64,
    pub work_type_match: f64,
    pub location_match: f64,
    pub equipment_match: f64,
    pub phase_match: f64,
    /// Bonus for a severe hazard of the primary category
    pub escalation: f64,
    pub primary_category: HazardCategory,
    pub high_severity: u8,
    pub similarity_boost: f64,
    pub similarity_boost_threshold: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            confidence: 10.0,
            usage: 5.0,
            work_type_match: 20.0,
            location_match: 15.0,
            equipment_match: 15.0,
            phase_match: 10.0,
            escalation: 25.0,
            primary_category: HazardCategory::Electrical,
            high_severity: 4,
            similarity_boost: 15.0,
            similarity_boost_threshold: 0.8,
        }
    }
}

/// Score one candidate against the query context.
///
/// Tag bonuses only apply when the hazard declares the tag; an empty
/// applicability set earns nothing on that axis.
pub fn relevance(hazard: &StructuredHazard, context: &QueryContext, weights: &RankingWeights) -> f64 {
    let confidence = if hazard.confidence_score.is_finite() {
        hazard.confidence_score
    } else {
        0.0
    };
    let mut score = confidence * weights.confidence;

    let usage = hazard.usage_count.max(0) as f64;
    score += (usage + 1.0).ln() * weights.usage;

    if hazard.applies_to_work_type(context.work_type) {
        score += weights.work_type_match;
    }
    if context
        .location
        .as_deref()
        .is_some_and(|location| hazard.applies_to_location(location))
    {
        score += weights.location_match;
    }
    if hazard.shares_equipment(&context.equipment) {
        score += weights.equipment_match;
    }
    if hazard.shares_phase(&context.phases) {
        score += weights.phase_match;
    }

    if hazard.severity >= weights.high_severity && hazard.hazard_category == weights.primary_category
    {
        score += weights.escalation;
    }

    if hazard
        .similarity
        .is_some_and(|s| s > weights.similarity_boost_threshold)
    {
        score += weights.similarity_boost;
    }

    score
}

/// Score, sort descending and keep the top `limit` candidates.
///
/// The sort is stable, so equal scores keep their fusion order.
pub fn rank(
    hazards: Vec<StructuredHazard>,
    context: &QueryContext,
    weights: &RankingWeights,
    limit: usize,
) -> Vec<StructuredHazard> {
    let mut scored: Vec<StructuredHazard> = hazards
        .into_iter()
        .map(|mut hazard| {
            hazard.relevance = Some(relevance(&hazard, context, weights));
            hazard
        })
        .collect();

    scored.sort_by(|a, b| {
        let (a, b) = (a.relevance.unwrap_or(0.0), b.relevance.unwrap_or(0.0));
        b.total_cmp(&a)
    });
    scored.truncate(limit);
    scored
}
