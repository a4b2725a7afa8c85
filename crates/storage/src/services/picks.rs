use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::dto::picks::PickSelection;
use crate::error::{Result, StorageError};
use crate::models::{Pick, TierAssignment, Tournament};
use crate::repository::{
    pick::PickRepository, tier::TierRepository, tournament::TournamentRepository,
    user::UserRepository,
};
use crate::services::scoring::ScoringRules;

/// Check a full pick sheet against the lock time and the tier rosters.
///
/// A sheet must contain exactly one pick for every tier of the ruleset, and each
/// player must be assigned to the tier they were picked in.
pub fn validate_selections(
    tournament: &Tournament,
    selections: &[PickSelection],
    assignments: &[TierAssignment],
    rules: &ScoringRules,
    now: DateTime<Utc>,
) -> Result<()> {
    if tournament.picks_locked(now) {
        return Err(StorageError::PicksLocked(tournament.tournament_id.clone()));
    }

    let mut seen = HashSet::new();
    for selection in selections {
        if !rules.has_tier(selection.tier_number) {
            return Err(StorageError::InvalidPick(format!(
                "tier {} does not exist (ruleset {} has {} tiers)",
                selection.tier_number, rules.version, rules.tier_count
            )));
        }
        if !seen.insert(selection.tier_number) {
            return Err(StorageError::InvalidPick(format!(
                "tier {} picked more than once",
                selection.tier_number
            )));
        }

        let assigned = assignments
            .iter()
            .any(|a| a.tier_number == selection.tier_number && a.player_id == selection.player_id);
        if !assigned {
            return Err(StorageError::InvalidPick(format!(
                "player {} is not in tier {}",
                selection.player_id, selection.tier_number
            )));
        }
    }

    let missing: Vec<String> = rules
        .tiers()
        .filter(|tier| !seen.contains(tier))
        .map(|tier| tier.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StorageError::InvalidPick(format!(
            "still missing tier {}",
            missing.join(", tier ")
        )));
    }

    Ok(())
}

/// Replace a user's picks for a tournament, provided it has not started yet.
pub async fn submit_picks(
    pool: &PgPool,
    tournament_id: &str,
    username: &str,
    selections: &[PickSelection],
    rules: &ScoringRules,
    now: DateTime<Utc>,
) -> Result<Vec<Pick>> {
    match UserRepository::new(pool).find_by_username(username).await {
        Ok(_) => {}
        Err(StorageError::NotFound) => {
            return Err(StorageError::InvalidPick(format!("unknown user {}", username)));
        }
        Err(e) => return Err(e),
    }

    // Holding the row lock keeps the rosters from changing under validation.
    let mut tx = pool.begin().await?;
    let tournament = TournamentRepository::lock_for_update(&mut tx, tournament_id).await?;
    let assignments = TierRepository::list_for_tournament_tx(&mut tx, tournament_id).await?;

    validate_selections(&tournament, selections, &assignments, rules, now)?;

    let picks = PickRepository::replace_for_user(&mut tx, tournament_id, username, selections, now)
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                StorageError::InvalidPick(format!("unknown user {}", username))
            } else {
                e
            }
        })?;
    tx.commit().await?;

    Ok(picks)
}

/// Picks visible to `viewer`: everyone's once the tournament started, only the
/// viewer's own before that. Returns whether all picks were revealed.
pub async fn visible_picks(
    pool: &PgPool,
    tournament: &Tournament,
    viewer: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(bool, Vec<Pick>)> {
    let repo = PickRepository::new(pool);

    if tournament.picks_locked(now) {
        return Ok((true, repo.list_for_tournament(&tournament.tournament_id).await?));
    }

    let own = match viewer {
        Some(username) => repo.list_for_user(&tournament.tournament_id, username).await?,
        None => Vec::new(),
    };

    Ok((false, own))
}
