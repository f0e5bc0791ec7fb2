//! Core types for the hazard retrieval domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Work type the job is carried out under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WorkType {
    Domestic,
    Commercial,
    Industrial,
}

impl WorkType {
    /// Tag used in the `applies_to_work_types` column.
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

/// Category of a hazard record.
///
/// Stored categories that are not recognised map to [`HazardCategory::Other`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HazardCategory {
    Electrical,
    Mechanical,
    Environmental,
    Fire,
    WorkingAtHeight,
    ManualHandling,
    Chemical,
    Other,
}

impl HazardCategory {
    pub fn from_tag(tag: &str) -> Self {
        normalize_tag(tag).parse().unwrap_or(Self::Other)
    }
}

/// Stable hazard identity, the only key used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HazardId(String);

impl HazardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HazardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for HazardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for HazardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single item of protective equipment required by a hazard's controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpeRequirement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
}

/// A pre-structured hazard record from the regulation knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredHazard {
    pub id: HazardId,
    pub hazard_description: String,
    pub hazard_category: HazardCategory,
    /// Likelihood on a 1-5 scale
    pub likelihood: u8,
    /// Severity on a 1-5 scale
    pub severity: u8,
    /// Stored risk score, or likelihood × severity when none was stored
    pub risk_score: i32,
    pub control_measures: Vec<String>,
    pub control_hierarchy: Option<String>,
    pub required_ppe: Vec<PpeRequirement>,
    pub applies_to_work_types: Vec<String>,
    pub applies_to_locations: Vec<String>,
    pub applies_to_equipment: Vec<String>,
    pub applies_to_installation_phases: Vec<String>,
    pub regulation_number: String,
    pub regulation_section: String,
    pub regulation_excerpt: Option<String>,
    /// Curation quality signal in [0, 1]
    pub confidence_score: f64,
    /// Number of past jobs that used this hazard
    pub usage_count: i64,
    /// Vector similarity, only set by the semantic strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    /// 1-based index into the requested phases, 0 for general hazards
    pub linked_step: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

/// Risk score convention: the stored value wins, otherwise likelihood × severity.
pub fn risk_score(stored: Option<i32>, likelihood: u8, severity: u8) -> i32 {
    stored.unwrap_or(i32::from(likelihood) * i32::from(severity))
}

impl StructuredHazard {
    pub fn applies_to_work_type(&self, work_type: WorkType) -> bool {
        contains_tag(&self.applies_to_work_types, &work_type.tag())
    }

    pub fn applies_to_location(&self, location: &str) -> bool {
        contains_tag(&self.applies_to_locations, location)
    }

    pub fn shares_equipment(&self, equipment: &[String]) -> bool {
        equipment
            .iter()
            .any(|tag| contains_tag(&self.applies_to_equipment, tag))
    }

    pub fn shares_phase(&self, phases: &[String]) -> bool {
        phases
            .iter()
            .any(|phase| contains_tag(&self.applies_to_installation_phases, phase))
    }
}

fn contains_tag(tags: &[String], tag: &str) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Normalize a free-form tag: trimmed, lower-cased, spaces and dashes as `_`.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// A hazard retrieval request.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    pub job_description: String,
    pub work_type: WorkType,
    pub location: Option<String>,
    pub equipment: Option<Vec<String>>,
    pub installation_phases: Option<Vec<String>>,
}

impl RetrievalParams {
    pub fn new(job_description: impl Into<String>, work_type: WorkType) -> Self {
        Self {
            job_description: job_description.into(),
            work_type,
            location: None,
            equipment: None,
            installation_phases: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_equipment(mut self, equipment: Vec<String>) -> Self {
        self.equipment = Some(equipment);
        self
    }

    pub fn with_installation_phases(mut self, phases: Vec<String>) -> Self {
        self.installation_phases = Some(phases);
        self
    }
}

/// Normalized query context produced by the feature extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub work_type: WorkType,
    pub location: Option<String>,
    pub equipment: Vec<String>,
    pub phases: Vec<String>,
}

/// Errors surfaced to callers of the retriever.
///
/// Only caller misuse is reported; backend failures degrade to fewer hazards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetrievalError {
    #[error("job description is required and must be non-empty")]
    EmptyJobDescription,

    #[error("job description must be at most {max} characters (got {len})")]
    JobDescriptionTooLong { len: usize, max: usize },

    #[error("work type is required")]
    MissingWorkType,

    #[error("unknown work type: {0}")]
    UnknownWorkType(String),
}

/// Statistics describing how well the knowledge base covered a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalSummary {
    pub total: usize,
    pub high_confidence: usize,
    pub average_confidence: f64,
    pub average_risk_score: f64,
    pub categories: Vec<HazardCategory>,
    pub has_rich_context: bool,
    pub insufficient: bool,
    pub semantic_hits: usize,
    pub context_hits: usize,
    pub critical_hits: usize,
}

/// Ranked hazards together with their coverage summary.
#[derive(Debug, Clone, Serialize)]
pub struct HazardReport {
    pub hazards: Vec<StructuredHazard>,
    pub summary: RetrievalSummary,
}
