use axum::{Json, extract::State};
use storage::dto::season::SeasonStanding;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/season/standings",
    responses(
        (status = 200, description = "Season points per user, best first", body = Vec<SeasonStanding>)
    ),
    tag = "season"
)]
pub async fn get_season_standings(
    State(state): State<AppState>,
) -> Result<Json<Vec<SeasonStanding>>, WebError> {
    let standings = services::season_standings(state.db.pool()).await?;

    Ok(Json(standings))
}
