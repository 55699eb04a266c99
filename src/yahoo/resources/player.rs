//! Players and their stats.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{from_fields, object};
use crate::{
    core::{de, decode},
    types::{CoveragePeriod, PlayerKey},
    yahoo::api::FantasyApi,
    Result,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerName {
    pub full: String,
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub ascii_first: Option<String>,
    #[serde(default)]
    pub ascii_last: Option<String>,
}

/// Where a rostered player is slotted for a period.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectedPosition {
    pub position: String,
    #[serde(default)]
    pub coverage_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub week: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_flex: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerInfo {
    pub player_key: PlayerKey,
    #[serde(deserialize_with = "de::lenient_string")]
    pub player_id: String,
    pub name: PlayerName,
    /// Injury or availability status such as `IR`, `Q` or `O`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_full: Option<String>,
    #[serde(default)]
    pub injury_note: Option<String>,
    #[serde(default)]
    pub editorial_team_abbr: Option<String>,
    #[serde(default)]
    pub display_position: Option<String>,
    #[serde(default)]
    pub position_type: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_undroppable: bool,
    /// Position codes, e.g. `["C", "LW"]`.
    pub eligible_positions: Vec<String>,
    /// Only present on roster listings.
    #[serde(default)]
    pub selected_position: Option<SelectedPosition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A player, as seen from a league, team or game.
#[derive(Debug, Clone)]
pub struct Player {
    pub info: PlayerInfo,
    api: FantasyApi,
}

impl Player {
    /// Build from the value under a `"player"` key.
    ///
    /// The payload mixes flattened key arrays and plain maps; both are merged.
    /// `eligible_positions` is reduced to position codes and
    /// `selected_position` to a single map.
    pub(crate) fn from_wire(api: FantasyApi, raw: &Value) -> Result<Self> {
        let mut fields = decode::merge_mixed(raw)?;

        if let Some(eligible) = fields.get("eligible_positions") {
            let codes = decode::flatten_field_array(eligible, "position")?
                .into_iter()
                .cloned()
                .collect();
            fields.insert("eligible_positions".to_string(), Value::Array(codes));
        }
        if let Some(selected) = fields.get("selected_position") {
            let merged = decode::flatten_keyed_array(selected)?;
            fields.insert("selected_position".to_string(), Value::Object(merged));
        }

        Ok(Self {
            info: from_fields("player", fields)?,
            api,
        })
    }

    pub fn key(&self) -> &PlayerKey {
        &self.info.player_key
    }

    pub fn full_name(&self) -> &str {
        &self.info.name.full
    }

    pub fn status(&self) -> Option<&str> {
        self.info.status.as_deref()
    }

    /// `true` if the player cannot be dropped.
    pub fn is_undroppable(&self) -> bool {
        self.info.is_undroppable
    }

    pub fn eligible_positions(&self) -> &[String] {
        &self.info.eligible_positions
    }

    /// Request a sub-resource of this player: `player/<key>/<sub_resource>`.
    pub async fn api_request(&self, sub_resource: &str) -> Result<Value> {
        self.api
            .get(&format!("player/{}/{}", self.info.player_key, sub_resource))
            .await
    }

    /// Stats for the season (`Current`), a week or a day.
    pub async fn get_stats(&self, period: CoveragePeriod) -> Result<PlayerStats> {
        let data = self.api_request(&period.stats_resource()).await?;
        PlayerStats::from_response(&data)
    }
}

/// One stat value. `value` is kept as sent; `-` means no value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatValue {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub stat_id: u32,
    #[serde(deserialize_with = "de::lenient_string")]
    pub value: String,
}

impl StatValue {
    pub fn as_f64(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub coverage_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub season: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub week: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    pub stats: Vec<StatValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerStats {
    /// `{"player": [info, {"player_stats": {"0": coverage, "stats": [{"stat": ..}]}}]}`
    pub(crate) fn from_response(data: &Value) -> Result<Self> {
        let (_, payload) = decode::unwrap_tuple(data, "player", 1)?;
        let player_stats = decode::require(payload, "player_stats")?;

        let mut fields = object("player stats coverage", decode::require(player_stats, "0")?)?;
        let stats = decode::flatten_field_array(decode::require(player_stats, "stats")?, "stat")?
            .into_iter()
            .cloned()
            .collect();
        fields.insert("stats".to_string(), Value::Array(stats));

        from_fields("player stats", fields)
    }

    pub fn value(&self, stat_id: u32) -> Option<&StatValue> {
        self.stats.iter().find(|s| s.stat_id == stat_id)
    }
}

/// A stat value paired with its category name from the game.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedStat {
    pub stat_id: u32,
    pub name: String,
    pub display_name: Option<String>,
    pub value: String,
}
