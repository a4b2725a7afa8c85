use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    dto::{
        picks::{PicksResponse, SubmitPicksRequest},
        results::{LiveResultsResponse, TournamentResultsResponse},
        tiers::TierPlayer,
    },
    models::Tournament,
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/tournaments",
    responses(
        (status = 200, description = "List all tournaments", body = Vec<Tournament>)
    ),
    tag = "tournaments"
)]
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tournament>>, WebError> {
    let tournaments = services::list_tournaments(state.db.pool()).await?;

    Ok(Json(tournaments))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/current",
    responses(
        (status = 200, description = "Tournament being played this week", body = Tournament),
        (status = 404, description = "No tournament this week")
    ),
    tag = "tournaments"
)]
pub async fn get_current_tournament(
    State(state): State<AppState>,
) -> Result<Json<Tournament>, WebError> {
    let tournament = services::current_tournament(state.db.pool(), Utc::now()).await?;

    Ok(Json(tournament))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/tiers",
    params(
        ("id" = String, Path, description = "Tournament id")
    ),
    responses(
        (status = 200, description = "Players available in each tier", body = Vec<TierPlayer>),
        (status = 404, description = "Tournament not found")
    ),
    tag = "tournaments"
)]
pub async fn list_tiers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TierPlayer>>, WebError> {
    let tiers = services::list_tiers(state.db.pool(), &id).await?;

    Ok(Json(tiers))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/picks",
    params(
        ("id" = String, Path, description = "Tournament id")
    ),
    responses(
        (status = 200, description = "Everyone's picks once the tournament has started, nothing before", body = PicksResponse),
        (status = 404, description = "Tournament not found")
    ),
    tag = "picks"
)]
pub async fn get_picks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PicksResponse>, WebError> {
    let picks = services::get_picks(state.db.pool(), &id, None, Utc::now()).await?;

    Ok(Json(picks))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/picks/{username}",
    params(
        ("id" = String, Path, description = "Tournament id"),
        ("username" = String, Path, description = "User viewing the picks")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The user's own picks before the start, everyone's after", body = PicksResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament not found")
    ),
    tag = "picks"
)]
pub async fn get_user_picks(
    State(state): State<AppState>,
    Path((id, username)): Path<(String, String)>,
) -> Result<Json<PicksResponse>, WebError> {
    let picks = services::get_picks(state.db.pool(), &id, Some(&username), Utc::now()).await?;

    Ok(Json(picks))
}

#[utoipa::path(
    put,
    path = "/api/tournaments/{id}/picks",
    params(
        ("id" = String, Path, description = "Tournament id")
    ),
    request_body = SubmitPicksRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Picks saved", body = PicksResponse),
        (status = 400, description = "Incomplete picks or player not in tier"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tournament not found"),
        (status = 409, description = "Tournament already started")
    ),
    tag = "picks"
)]
pub async fn submit_picks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitPicksRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let picks = services::submit_picks(
        state.db.pool(),
        &id,
        &req.username,
        &req.picks,
        state.rules(),
        Utc::now(),
    )
    .await?;

    tracing::info!("{} saved {} picks for {}", req.username, picks.len(), id);

    Ok((
        StatusCode::OK,
        Json(PicksResponse {
            tournament_id: id,
            revealed: false,
            picks,
        }),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/results",
    params(
        ("id" = String, Path, description = "Tournament id")
    ),
    responses(
        (status = 200, description = "Final per-pick and per-user results", body = TournamentResultsResponse),
        (status = 404, description = "Tournament not found or not finalized")
    ),
    tag = "results"
)]
pub async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TournamentResultsResponse>, WebError> {
    let results = services::get_results(state.db.pool(), &id).await?;

    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/live",
    params(
        ("id" = String, Path, description = "Tournament id")
    ),
    responses(
        (status = 200, description = "Unofficial scores from the live leaderboard, picks hidden until the start time", body = LiveResultsResponse),
        (status = 404, description = "Tournament not found"),
        (status = 503, description = "Leaderboard not available yet")
    ),
    tag = "results"
)]
pub async fn get_live_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LiveResultsResponse>, WebError> {
    let live = services::live_results(state.db.pool(), &state.coordinator, &id, Utc::now()).await?;

    Ok(Json(live))
}
