//! PostgreSQL repository implementation with pgvector support.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;
use tracing::debug;

use crate::domain::hazards::traits::{HazardError, HazardRepository, Result};
use crate::domain::hazards::types::{
    risk_score, HazardCategory, HazardId, PpeRequirement, QueryContext, StructuredHazard,
    WorkType,
};

/// Columns selected for every hazard query, in `HazardRow` order.
const HAZARD_COLUMNS: &str = r#"
    id::text AS id,
    hazard_description,
    hazard_category,
    likelihood::int4 AS likelihood,
    severity::int4 AS severity,
    risk_score::int4 AS risk_score,
    control_measures,
    control_hierarchy,
    required_ppe,
    applies_to_work_types,
    applies_to_locations,
    applies_to_equipment,
    applies_to_installation_phases,
    regulation_number,
    regulation_section,
    regulation_excerpt,
    confidence_score::float8 AS confidence_score,
    usage_count::int8 AS usage_count
"#;

/// PostgreSQL-backed hazard repository over `regulation_hazards_extracted`.
///
/// Vector search goes through the `match_extracted_hazards` database
/// function (pgvector cosine similarity); attribute lookups are plain
/// array-overlap queries. The repository never writes.
#[derive(Clone)]
pub struct PgHazardRepository {
    pool: PgPool,
}

impl PgHazardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HazardRepository for PgHazardRepository {
    async fn similar(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>> {
        let sql = format!(
            r#"
            SELECT {HAZARD_COLUMNS}, similarity::float8 AS similarity
            FROM match_extracted_hazards($1, $2::float8, $3::int4)
            ORDER BY similarity DESC
            "#
        );

        let rows = sqlx::query_as::<_, HazardRow>(&sql)
            .bind(Vector::from(embedding.to_vec()))
            .bind(threshold)
            .bind(sql_limit(limit)?)
            .fetch_all(&self.pool)
            .await?;

        Ok(map_hazard_rows(rows))
    }

    async fn by_context(
        &self,
        context: &QueryContext,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>> {
        let sql = format!(
            r#"
            SELECT {HAZARD_COLUMNS}, NULL::float8 AS similarity
            FROM regulation_hazards_extracted
            WHERE (COALESCE(cardinality(applies_to_work_types), 0) = 0
                   OR EXISTS (SELECT 1 FROM unnest(applies_to_work_types) t WHERE lower(t) = $1))
              AND ($2::text IS NULL
                   OR COALESCE(cardinality(applies_to_locations), 0) = 0
                   OR EXISTS (SELECT 1 FROM unnest(applies_to_locations) t WHERE lower(t) = $2))
              AND (cardinality($3::text[]) = 0
                   OR COALESCE(cardinality(applies_to_equipment), 0) = 0
                   OR EXISTS (SELECT 1 FROM unnest(applies_to_equipment) t
                              WHERE lower(t) = ANY($3::text[])))
            ORDER BY confidence_score DESC NULLS LAST, usage_count DESC NULLS LAST
            LIMIT $4::int4
            "#
        );

        let (location, equipment) = lower_context(context);

        let rows = sqlx::query_as::<_, HazardRow>(&sql)
            .bind(context.work_type.tag())
            .bind(location)
            .bind(equipment)
            .bind(sql_limit(limit)?)
            .fetch_all(&self.pool)
            .await?;

        Ok(map_hazard_rows(rows))
    }

    async fn critical(
        &self,
        work_type: WorkType,
        min_confidence: f64,
        primary_category: Option<HazardCategory>,
        limit: i64,
    ) -> Result<Vec<StructuredHazard>> {
        let sql = format!(
            r#"
            SELECT {HAZARD_COLUMNS}, NULL::float8 AS similarity
            FROM regulation_hazards_extracted
            WHERE COALESCE(confidence_score, 0) > $2
              AND (COALESCE(cardinality(applies_to_work_types), 0) = 0
                   OR EXISTS (SELECT 1 FROM unnest(applies_to_work_types) t WHERE lower(t) = $1)
                   OR ($3::text IS NOT NULL AND lower(hazard_category) = $3))
            ORDER BY confidence_score DESC
            LIMIT $4::int4
            "#
        );

        let rows = sqlx::query_as::<_, HazardRow>(&sql)
            .bind(work_type.tag())
            .bind(min_confidence)
            .bind(primary_category.map(|c| c.to_string()))
            .bind(sql_limit(limit)?)
            .fetch_all(&self.pool)
            .await?;

        Ok(map_hazard_rows(rows))
    }
}

/// Query values are already normalized lower-case tags; stored tags are
/// lowered in SQL so matching is case-insensitive on both sides.
fn lower_context(context: &QueryContext) -> (Option<String>, Vec<String>) {
    (
        context.location.as_deref().map(str::to_lowercase),
        context.equipment.iter().map(|e| e.to_lowercase()).collect(),
    )
}

fn sql_limit(limit: i64) -> Result<i32> {
    i32::try_from(limit)
        .ok()
        .filter(|l| *l > 0)
        .ok_or_else(|| HazardError::ConfigError(format!("query limit out of range: {limit}")))
}

fn map_hazard_rows(rows: Vec<HazardRow>) -> Vec<StructuredHazard> {
    rows.into_iter().map(StructuredHazard::from).collect()
}

fn parse_ppe(id: &str, value: Option<serde_json::Value>) -> Vec<PpeRequirement> {
    match value {
        Some(serde_json::Value::Null) | None => vec![],
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            debug!(hazard_id = id, error = %e, "ignoring malformed required_ppe");
            vec![]
        }),
    }
}

fn scale(value: i32) -> u8 {
    value.clamp(1, 5) as u8
}

impl From<HazardRow> for StructuredHazard {
    fn from(row: HazardRow) -> Self {
        let likelihood = scale(row.likelihood);
        let severity = scale(row.severity);
        let required_ppe = parse_ppe(&row.id, row.required_ppe);

        StructuredHazard {
            id: HazardId::from(row.id),
            hazard_description: row.hazard_description,
            hazard_category: HazardCategory::from_tag(&row.hazard_category),
            likelihood,
            severity,
            risk_score: risk_score(row.risk_score, likelihood, severity),
            control_measures: row.control_measures.unwrap_or_default(),
            control_hierarchy: row.control_hierarchy,
            required_ppe,
            applies_to_work_types: row.applies_to_work_types.unwrap_or_default(),
            applies_to_locations: row.applies_to_locations.unwrap_or_default(),
            applies_to_equipment: row.applies_to_equipment.unwrap_or_default(),
            applies_to_installation_phases: row
                .applies_to_installation_phases
                .unwrap_or_default(),
            regulation_number: row.regulation_number,
            regulation_section: row.regulation_section,
            regulation_excerpt: row.regulation_excerpt,
            confidence_score: row
                .confidence_score
                .filter(|c| c.is_finite())
                .unwrap_or(0.0)
                .clamp(0.0, 1.0),
            usage_count: row.usage_count.unwrap_or(0).max(0),
            similarity: row.similarity,
            linked_step: 0,
            relevance: None,
        }
    }
}

// Row type for sqlx queries

#[derive(sqlx::FromRow)]
struct HazardRow {
    id: String,
    hazard_description: String,
    hazard_category: String,
    likelihood: i32,
    severity: i32,
    risk_score: Option<i32>,
    control_measures: Option<Vec<String>>,
    control_hierarchy: Option<String>,
    required_ppe: Option<serde_json::Value>,
    applies_to_work_types: Option<Vec<String>>,
    applies_to_locations: Option<Vec<String>>,
    applies_to_equipment: Option<Vec<String>>,
    applies_to_installation_phases: Option<Vec<String>>,
    regulation_number: String,
    regulation_section: String,
    regulation_excerpt: Option<String>,
    confidence_score: Option<f64>,
    usage_count: Option<i64>,
    similarity: Option<f64>,
}
