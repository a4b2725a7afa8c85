use std::collections::HashMap;

use sqlx::PgPool;

use crate::dto::season::SeasonStanding;
use crate::error::Result;
use crate::models::{TournamentScore, User};
use crate::repository::{results::ResultRepository, user::UserRepository};

/// Sum finalized tournament points per user.
///
/// `users` must already be in tie-break order (display name); the sort below is
/// stable so equal totals keep that order. Users without any score get zero and
/// scores for unknown usernames are ignored.
pub fn season_standings(users: &[User], scores: &[TournamentScore]) -> Vec<SeasonStanding> {
    let mut totals: HashMap<&str, (i64, i64)> = HashMap::new();
    for score in scores {
        let entry = totals.entry(score.username.as_str()).or_default();
        entry.0 += i64::from(score.points);
        entry.1 += 1;
    }

    let mut standings: Vec<SeasonStanding> = users
        .iter()
        .map(|user| {
            let (total_points, tournaments_scored) =
                totals.get(user.username.as_str()).copied().unwrap_or_default();
            SeasonStanding {
                rank: 0,
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                total_points,
                tournaments_scored,
            }
        })
        .collect();

    standings.sort_by(|a, b| b.total_points.cmp(&a.total_points));

    // Competition ranking: equal totals share a rank, the next rank skips.
    let mut previous: Option<(i64, i64)> = None;
    for (idx, standing) in standings.iter_mut().enumerate() {
        let rank = match previous {
            Some((points, rank)) if points == standing.total_points => rank,
            _ => idx as i64 + 1,
        };
        standing.rank = rank;
        previous = Some((standing.total_points, rank));
    }

    standings
}

pub async fn load_season_standings(pool: &PgPool) -> Result<Vec<SeasonStanding>> {
    let users = UserRepository::new(pool).list().await?;
    let scores = ResultRepository::new(pool).list_finalized_scores().await?;

    Ok(season_standings(&users, &scores))
}
