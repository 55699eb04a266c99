//! Game metadata: what a game is, how it scores and how rosters are shaped.

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{from_fields, object};
use crate::{core::de, core::decode, types::GameKey, Result};

/// Summary of a fantasy game (sport and season).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameInfo {
    pub game_key: GameKey,
    #[serde(deserialize_with = "de::lenient_string")]
    pub game_id: String,
    pub name: String,
    /// Sport code, e.g. `nfl`.
    pub code: String,
    #[serde(default, rename = "type")]
    pub game_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(deserialize_with = "de::lenient_u32")]
    pub season: u32,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_game_over: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_offseason: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameInfo {
    pub(crate) fn from_wire(raw: &Value) -> Result<Self> {
        from_fields("game", object("game", raw)?)
    }
}

/// One scoring week.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameWeek {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub week: u32,
    #[serde(default, deserialize_with = "de::opt_lenient_string")]
    pub display_name: Option<String>,
    #[serde(deserialize_with = "de::date")]
    pub start: NaiveDate,
    #[serde(deserialize_with = "de::date")]
    pub end: NaiveDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameWeek {
    pub(crate) fn from_wire(raw: &Value) -> Result<Self> {
        from_fields("game week", object("game week", raw)?)
    }

    pub fn is_current_on(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// True if today (local time) falls inside this week.
    pub fn is_current(&self) -> bool {
        self.is_current_on(Local::now().date_naive())
    }
}

/// A stat category the game tracks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameStat {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub stat_id: u32,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// True when a larger value is better.
    #[serde(deserialize_with = "de::flag")]
    pub sort_order: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_composite_stat: bool,
    /// Position type codes the stat applies to.
    #[serde(default)]
    pub position_types: Vec<String>,
    /// Stat ids a composite stat is computed from.
    #[serde(default, deserialize_with = "de::lenient_u32_seq")]
    pub base_stats: Vec<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameStat {
    /// `position_types: [{"position_type": "O"}]` becomes `["O"]` and
    /// `base_stats: [{"base_stat": {"stat_id": "4"}}]` becomes `[4]`.
    pub(crate) fn from_wire(raw: &Value) -> Result<Self> {
        let mut fields = object("stat", raw)?;

        if let Some(position_types) = fields.get("position_types") {
            let flat = decode::flatten_field_array(position_types, "position_type")?
                .into_iter()
                .cloned()
                .collect();
            fields.insert("position_types".to_string(), Value::Array(flat));
        }
        if let Some(base_stats) = fields.get("base_stats") {
            let base = Value::Array(
                decode::flatten_field_array(base_stats, "base_stat")?
                    .into_iter()
                    .cloned()
                    .collect(),
            );
            let ids = decode::flatten_field_array(&base, "stat_id")?
                .into_iter()
                .cloned()
                .collect();
            fields.insert("base_stats".to_string(), Value::Array(ids));
        }

        from_fields("stat", fields)
    }
}

/// A group of positions, e.g. `O` for offense.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionType {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A roster slot the game defines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterPosition {
    pub position: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub position_type: Option<String>,
    /// Players here are not used for scoring.
    #[serde(default, deserialize_with = "de::flag")]
    pub is_bench: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_disabled_list: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PositionType {
    pub(crate) fn from_wire(raw: &Value) -> Result<Self> {
        from_fields("position type", object("position type", raw)?)
    }
}

impl RosterPosition {
    pub(crate) fn from_wire(raw: &Value) -> Result<Self> {
        from_fields("roster position", object("roster position", raw)?)
    }
}
