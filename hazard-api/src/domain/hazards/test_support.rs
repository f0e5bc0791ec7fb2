//! Shared fixtures for the retrieval tests.

use super::types::{HazardCategory, HazardId, StructuredHazard};

/// A plain electrical hazard with no declared applicability and middling scores.
pub(crate) fn hazard(id: &str) -> StructuredHazard {
    StructuredHazard {
        id: HazardId::from(id),
        hazard_description: format!("Hazard {id}"),
        hazard_category: HazardCategory::Electrical,
        likelihood: 2,
        severity: 2,
        risk_score: 4,
        control_measures: vec![],
        control_hierarchy: None,
        required_ppe: vec![],
        applies_to_work_types: vec![],
        applies_to_locations: vec![],
        applies_to_equipment: vec![],
        applies_to_installation_phases: vec![],
        regulation_number: "411.3.3".to_string(),
        regulation_section: "Protection against electric shock".to_string(),
        regulation_excerpt: None,
        confidence_score: 0.5,
        usage_count: 0,
        similarity: None,
        linked_step: 0,
        relevance: None,
    }
}

pub(crate) fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
