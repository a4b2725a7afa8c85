use chrono::{DateTime, TimeDelta, Utc};
use finalizer::PgCoordinator;
use sqlx::PgPool;
use storage::{
    dto::{
        picks::{PickSelection, PicksResponse},
        results::{LiveResultsResponse, TournamentResultsResponse},
        tiers::TierPlayer,
    },
    error::{Result, StorageError},
    models::{Pick, Tournament},
    repository::{
        results::ResultRepository, tier::TierRepository, tournament::TournamentRepository,
    },
    services::{picks, scoring::ScoringRules},
};

use crate::error::ApiResult;

/// How far back a started tournament still counts as "this week"
const CURRENT_LOOKBACK: TimeDelta = TimeDelta::days(4);
/// How early an upcoming tournament becomes "this week"
const CURRENT_LOOKAHEAD: TimeDelta = TimeDelta::days(3);

pub async fn list_tournaments(pool: &PgPool) -> Result<Vec<Tournament>> {
    TournamentRepository::new(pool).list().await
}

pub async fn current_tournament(pool: &PgPool, now: DateTime<Utc>) -> Result<Tournament> {
    TournamentRepository::new(pool)
        .find_current(now, CURRENT_LOOKBACK, CURRENT_LOOKAHEAD)
        .await
}

pub async fn list_tiers(pool: &PgPool, tournament_id: &str) -> Result<Vec<TierPlayer>> {
    TournamentRepository::new(pool).find_by_id(tournament_id).await?;
    TierRepository::new(pool)
        .list_players_for_tournament(tournament_id)
        .await
}

pub async fn get_picks(
    pool: &PgPool,
    tournament_id: &str,
    viewer: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PicksResponse> {
    let tournament = TournamentRepository::new(pool).find_by_id(tournament_id).await?;
    let (revealed, picks) = picks::visible_picks(pool, &tournament, viewer, now).await?;

    Ok(PicksResponse {
        tournament_id: tournament.tournament_id,
        revealed,
        picks,
    })
}

pub async fn submit_picks(
    pool: &PgPool,
    tournament_id: &str,
    username: &str,
    selections: &[PickSelection],
    rules: &ScoringRules,
    now: DateTime<Utc>,
) -> Result<Vec<Pick>> {
    picks::submit_picks(pool, tournament_id, username, selections, rules, now).await
}

/// Persisted results of a finalized tournament.
pub async fn get_results(pool: &PgPool, tournament_id: &str) -> Result<TournamentResultsResponse> {
    let tournament = TournamentRepository::new(pool).find_by_id(tournament_id).await?;
    if !tournament.is_finalized {
        return Err(StorageError::NotFound);
    }

    let repo = ResultRepository::new(pool);
    let picks = repo.list_pick_results(tournament_id).await?;
    let scores = repo.list_scores_for_tournament(tournament_id).await?;

    Ok(TournamentResultsResponse {
        tournament,
        picks,
        scores,
    })
}

pub async fn live_results(
    pool: &PgPool,
    coordinator: &PgCoordinator,
    tournament_id: &str,
    now: DateTime<Utc>,
) -> ApiResult<LiveResultsResponse> {
    let tournament = TournamentRepository::new(pool).find_by_id(tournament_id).await?;
    let preview = coordinator.preview(&tournament, now).await?;

    Ok(LiveResultsResponse {
        tournament_id: preview.tournament_id,
        revealed: preview.revealed,
        standings: preview.standings,
        picks: preview.outcome.pick_results,
        scores: preview.outcome.tournament_scores,
        skipped: preview.skipped.iter().map(ToString::to_string).collect(),
    })
}
