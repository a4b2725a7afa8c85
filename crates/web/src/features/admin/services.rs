use chrono::Utc;
use finalizer::{FinalizeMode, FinalizeReport, PgCoordinator};
use sqlx::PgPool;
use storage::{
    dto::tiers::TierRoster,
    error::Result,
    models::TierAssignment,
    services::{scoring::ScoringRules, tiers},
};

use crate::error::ApiResult;

pub async fn finalize_latest(coordinator: &PgCoordinator) -> ApiResult<FinalizeReport> {
    Ok(coordinator.finalize_latest(Utc::now()).await?)
}

pub async fn finalize_tournament(
    coordinator: &PgCoordinator,
    tournament_id: &str,
    force: bool,
) -> ApiResult<FinalizeReport> {
    let mode = if force {
        FinalizeMode::Force
    } else {
        FinalizeMode::Normal
    };

    Ok(coordinator
        .finalize_by_id(tournament_id, mode, Utc::now())
        .await?)
}

pub async fn set_tiers(
    pool: &PgPool,
    tournament_id: &str,
    rosters: &[TierRoster],
    rules: &ScoringRules,
) -> Result<Vec<TierAssignment>> {
    tiers::set_tiers(pool, tournament_id, rosters, rules).await
}
