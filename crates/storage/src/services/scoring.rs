//! Tier scoring for a single tournament.
//!
//! Given every pick made for a tournament and the final standings, decides the
//! tier winners, applies missed-cut penalties and awards the team-total bonus.
//! Nothing here touches the database: callers load inputs and persist outputs.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Pick, PickResult, PlayerStanding, TournamentScore};

/// Revisions of the game's scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RulesetVersion {
    /// Five tiers, no team bonus, finalized one hour after start.
    V1,
    /// Six tiers, team-total bonus, finalized five days after start.
    #[default]
    V2,
}

impl RulesetVersion {
    pub fn rules(self) -> ScoringRules {
        match self {
            Self::V1 => ScoringRules {
                version: self,
                tier_count: 5,
                team_bonus: false,
                finalization_window: TimeDelta::hours(1),
            },
            Self::V2 => ScoringRules {
                version: self,
                tier_count: 6,
                team_bonus: true,
                finalization_window: TimeDelta::days(5),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for RulesetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RulesetVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" | "legacy" => Ok(Self::V1),
            "v2" | "2" | "current" => Ok(Self::V2),
            other => Err(format!("unknown scoring ruleset '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    pub version: RulesetVersion,
    pub tier_count: i16,
    pub team_bonus: bool,
    /// Delay after the start time before a tournament may be finalized
    pub finalization_window: TimeDelta,
}

impl ScoringRules {
    pub fn tiers(&self) -> RangeInclusive<i16> {
        1..=self.tier_count
    }

    pub fn has_tier(&self, tier_number: i16) -> bool {
        self.tiers().contains(&tier_number)
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        RulesetVersion::default().rules()
    }
}

/// Standings keyed by player id.
pub type StandingsIndex = HashMap<String, PlayerStanding>;

pub fn index_standings(rows: impl IntoIterator<Item = PlayerStanding>) -> StandingsIndex {
    rows.into_iter()
        .map(|row| (row.player_id.clone(), row))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringOutcome {
    /// Ordered by tier, then username
    pub pick_results: Vec<PickResult>,
    /// Ordered by username
    pub tournament_scores: Vec<TournamentScore>,
}

#[derive(Default)]
struct UserTally {
    points: i32,
    team_total: Option<i32>,
}

pub fn compute(
    tournament_id: &str,
    picks: &[Pick],
    standings: &StandingsIndex,
    rules: &ScoringRules,
) -> ScoringOutcome {
    let score_of = |player_id: &str| standings.get(player_id).and_then(|s| s.score_to_par);

    // Winner pool is the picked players only, not the whole tier roster.
    let mut best_by_tier: BTreeMap<i16, i32> = BTreeMap::new();
    for pick in picks {
        if let Some(score) = score_of(&pick.player_id) {
            best_by_tier
                .entry(pick.tier_number)
                .and_modify(|best| *best = (*best).min(score))
                .or_insert(score);
        }
    }

    let mut ordered: Vec<&Pick> = picks.iter().collect();
    ordered.sort_by(|a, b| {
        a.tier_number
            .cmp(&b.tier_number)
            .then_with(|| a.username.cmp(&b.username))
    });

    let mut pick_results = Vec::with_capacity(ordered.len());
    let mut tallies: BTreeMap<&str, UserTally> = BTreeMap::new();

    for pick in ordered {
        let standing = standings.get(&pick.player_id);
        let score = standing.and_then(|s| s.score_to_par);

        let tier_winner = match (score, best_by_tier.get(&pick.tier_number)) {
            (Some(score), Some(best)) => score == *best,
            _ => false,
        };
        let missed_cut = standing.is_some_and(PlayerStanding::missed_cut);
        let points = i32::from(tier_winner) - i32::from(missed_cut);

        let tally = tallies.entry(pick.username.as_str()).or_default();
        tally.points += points;
        if let Some(score) = score {
            tally.team_total = Some(tally.team_total.unwrap_or(0) + score);
        }

        pick_results.push(PickResult {
            pick_score_id: PickResult::key(tournament_id, &pick.username, pick.tier_number),
            tournament_id: tournament_id.to_string(),
            username: pick.username.clone(),
            tier_number: pick.tier_number,
            player_id: pick.player_id.clone(),
            player_score: standing
                .map(|s| s.score_text.clone())
                .unwrap_or_else(|| "-".to_string()),
            tier_winner,
            missed_cut,
            points,
        });
    }

    let best_team_total = tallies.values().filter_map(|t| t.team_total).min();

    let tournament_scores = tallies
        .into_iter()
        .map(|(username, tally)| {
            let team_bonus =
                rules.team_bonus && tally.team_total.is_some() && tally.team_total == best_team_total;

            TournamentScore {
                tournament_score_id: TournamentScore::key(tournament_id, username),
                tournament_id: tournament_id.to_string(),
                username: username.to_string(),
                team_total: tally.team_total,
                team_bonus,
                points: tally.points + i32::from(team_bonus),
            }
        })
        .collect();

    ScoringOutcome {
        pick_results,
        tournament_scores,
    }
}
