use serde::Deserialize;
use serde_json::Value;

/// Body of `GET /leaderboard`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub leaderboard_rows: Option<Vec<LeaderboardRow>>,
}

/// Raw provider row. Field types vary between tournaments (ids and positions
/// show up both as strings and numbers), so they are kept as JSON values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    #[serde(default)]
    pub player_id: Option<Value>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
}

impl LeaderboardRow {
    pub fn player_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// String or number rendered as text; anything else is treated as absent.
pub(crate) fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
