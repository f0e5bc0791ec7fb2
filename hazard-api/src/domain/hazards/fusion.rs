//! Candidate fusion: canonical concatenation, identity dedupe, phase linking.

use itertools::Itertools;

use super::types::StructuredHazard;

/// Merge the strategy outputs into one candidate list.
///
/// Candidates are taken in the fixed order semantic, context, critical no
/// matter which strategy finished first. The first occurrence of an id wins,
/// so a hazard found by the semantic strategy keeps its similarity even when
/// the other strategies return it too.
pub fn fuse(
    semantic: Vec<StructuredHazard>,
    context: Vec<StructuredHazard>,
    critical: Vec<StructuredHazard>,
    phases: &[String],
) -> Vec<StructuredHazard> {
    semantic
        .into_iter()
        .chain(context)
        .chain(critical)
        .unique_by(|h| h.id.clone())
        .map(|mut hazard| {
            hazard.linked_step = link_step(&hazard, phases);
            hazard
        })
        .collect()
}

/// 1-based position of the first requested phase the hazard applies to, or 0.
pub fn link_step(hazard: &StructuredHazard, phases: &[String]) -> u32 {
    phases
        .iter()
        .position(|phase| {
            hazard
                .applies_to_installation_phases
                .iter()
                .any(|p| p.eq_ignore_ascii_case(phase))
        })
        .map_or(0, |index| index as u32 + 1)
}
