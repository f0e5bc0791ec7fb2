use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::hazards::{HazardReport, RetrievalError, RetrievalParams, WorkType},
    AppState,
};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(retrieve_hazards))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HazardRequest {
    #[serde(default)]
    job_description: String,
    work_type: Option<String>,
    location: Option<String>,
    equipment: Option<Vec<String>>,
    installation_phases: Option<Vec<String>>,
}

impl TryFrom<HazardRequest> for RetrievalParams {
    type Error = RetrievalError;

    fn try_from(request: HazardRequest) -> Result<Self, Self::Error> {
        let work_type = request
            .work_type
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .ok_or(RetrievalError::MissingWorkType)?;
        let work_type: WorkType = work_type
            .parse()
            .map_err(|_| RetrievalError::UnknownWorkType(work_type.to_string()))?;

        Ok(Self {
            job_description: request.job_description,
            work_type,
            location: request.location,
            equipment: request.equipment,
            installation_phases: request.installation_phases,
        })
    }
}

#[instrument(name = "POST /hazards", skip(app_state))]
async fn retrieve_hazards(
    State(app_state): State<AppState>,
    Json(request): Json<HazardRequest>,
) -> Result<Json<HazardReport>, ApiError> {
    let params = RetrievalParams::try_from(request)?;
    let report = app_state.hazards.retrieve(params).await?;

    Ok(Json(report))
}
