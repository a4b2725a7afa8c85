use sqlx::PgPool;

use crate::dto::tiers::TierRoster;
use crate::error::{Result, StorageError};
use crate::models::TierAssignment;
use crate::repository::{
    pick::PickRepository, tier::TierRepository, tournament::TournamentRepository,
};
use crate::services::scoring::ScoringRules;

pub fn build_assignments(
    tournament_id: &str,
    rosters: &[TierRoster],
    rules: &ScoringRules,
) -> Result<Vec<TierAssignment>> {
    let mut assignments = Vec::new();

    for roster in rosters {
        if !rules.has_tier(roster.tier_number) {
            return Err(StorageError::ConstraintViolation(format!(
                "tier {} does not exist (ruleset {} has {} tiers)",
                roster.tier_number, rules.version, rules.tier_count
            )));
        }

        for player_id in &roster.player_ids {
            let player_id = player_id.trim();
            if player_id.is_empty() {
                continue;
            }
            if assignments
                .iter()
                .any(|a: &TierAssignment| a.player_id == player_id)
            {
                return Err(StorageError::ConstraintViolation(format!(
                    "player {} is assigned to more than one tier",
                    player_id
                )));
            }
            assignments.push(TierAssignment {
                tournament_id: tournament_id.to_string(),
                tier_number: roster.tier_number,
                player_id: player_id.to_string(),
            });
        }
    }

    Ok(assignments)
}

pub fn ensure_unfrozen(tournament_id: &str, existing_picks: i64) -> Result<()> {
    if existing_picks > 0 {
        return Err(StorageError::ConstraintViolation(format!(
            "tiers for {} are frozen: {} picks already reference them",
            tournament_id, existing_picks
        )));
    }
    Ok(())
}

/// Replace a tournament's tier rosters. Rosters are frozen once anyone has picked.
pub async fn set_tiers(
    pool: &PgPool,
    tournament_id: &str,
    rosters: &[TierRoster],
    rules: &ScoringRules,
) -> Result<Vec<TierAssignment>> {
    let assignments = build_assignments(tournament_id, rosters, rules)?;

    let mut tx = pool.begin().await?;
    TournamentRepository::lock_for_update(&mut tx, tournament_id).await?;
    let existing_picks = PickRepository::count_for_tournament(&mut tx, tournament_id).await?;
    ensure_unfrozen(tournament_id, existing_picks)?;

    TierRepository::replace_for_tournament(&mut tx, tournament_id, &assignments)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                StorageError::ConstraintViolation("duplicate tier assignment".to_string())
            } else {
                e
            }
        })?;
    tx.commit().await?;

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::RulesetVersion;

    fn roster(tier_number: i16, players: &[&str]) -> TierRoster {
        TierRoster {
            tier_number,
            player_ids: players.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_assignments_flattens_rosters() {
        let rules = RulesetVersion::V2.rules();
        let assignments = build_assignments(
            "t1",
            &[roster(1, &["46046", "50525"]), roster(2, &[" 28237 ", ""])],
            &rules,
        )
        .unwrap();

        assert_eq!(assignments.len(), 3);
        assert_eq!(assignments[2].tier_number, 2);
        assert_eq!(assignments[2].player_id, "28237");
    }

    #[test]
    fn test_player_in_two_tiers_is_rejected() {
        let rules = RulesetVersion::V2.rules();
        let result = build_assignments("t1", &[roster(1, &["1"]), roster(2, &["1"])], &rules);

        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
    }

    #[test]
    fn test_tiers_frozen_once_picked() {
        assert!(ensure_unfrozen("t1", 0).is_ok());

        let err = ensure_unfrozen("t1", 4).unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(msg) if msg.contains("4 picks")));
    }

    #[test]
    fn test_tier_outside_ruleset_is_rejected() {
        let rules = RulesetVersion::V1.rules();
        let result = build_assignments("t1", &[roster(6, &["1"])], &rules);

        assert!(result.is_err());
    }
}
