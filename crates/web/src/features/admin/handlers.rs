use axum::{
    Json,
    extract::{Path, Query, State},
};
use finalizer::FinalizeReport;
use serde::{Deserialize, Serialize};
use storage::{dto::tiers::SetTiersRequest, models::TierAssignment};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinalizeResponse {
    pub ok: bool,
    pub message: String,
    pub tournament_id: String,
    pub already_finalized: bool,
    pub picks_scored: usize,
    pub users_scored: usize,
    pub skipped: Vec<String>,
}

impl From<FinalizeReport> for FinalizeResponse {
    fn from(report: FinalizeReport) -> Self {
        Self {
            ok: true,
            message: report.message(),
            tournament_id: report.tournament_id,
            already_finalized: report.already_finalized,
            picks_scored: report.picks_scored,
            users_scored: report.users_scored,
            skipped: report.skipped.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FinalizeParams {
    /// Recompute results even if the tournament is already finalized
    #[serde(default)]
    pub force: bool,
}

#[utoipa::path(
    post,
    path = "/api/admin/finalize",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Most recent due tournament finalized", body = FinalizeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No tournament is due for finalization"),
        (status = 503, description = "Leaderboard not available yet")
    ),
    tag = "admin"
)]
pub async fn finalize_latest(
    State(state): State<AppState>,
) -> Result<Json<FinalizeResponse>, WebError> {
    let report = services::finalize_latest(&state.coordinator).await?;

    Ok(Json(report.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/tournaments/{id}/finalize",
    params(
        ("id" = String, Path, description = "Tournament id"),
        FinalizeParams
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tournament finalized, or already final", body = FinalizeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament not found"),
        (status = 503, description = "Leaderboard not available yet")
    ),
    tag = "admin"
)]
pub async fn finalize_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<FinalizeParams>,
) -> Result<Json<FinalizeResponse>, WebError> {
    let report = services::finalize_tournament(&state.coordinator, &id, params.force).await?;

    Ok(Json(report.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/tournaments/{id}/tiers",
    params(
        ("id" = String, Path, description = "Tournament id")
    ),
    request_body = SetTiersRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Tier assignments replaced", body = Vec<TierAssignment>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament not found"),
        (status = 409, description = "Picks already exist or a player is in two tiers")
    ),
    tag = "admin"
)]
pub async fn set_tiers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetTiersRequest>,
) -> Result<Json<Vec<TierAssignment>>, WebError> {
    req.validate()?;

    let assignments = services::set_tiers(state.db.pool(), &id, &req.tiers, state.rules()).await?;
    tracing::info!("Set {} tier assignments for {}", assignments.len(), id);

    Ok(Json(assignments))
}
