//! League settings: roster shape and scoring.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{from_fields, object};
use crate::{
    core::{de, decode},
    Result, YahooError,
};

/// How many of one roster slot a league uses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueRosterPosition {
    pub position: String,
    #[serde(default)]
    pub position_type: Option<String>,
    #[serde(deserialize_with = "de::lenient_u32")]
    pub count: u32,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_starting_position: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stat category as configured in a league.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueStatCategory {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub stat_id: u32,
    #[serde(default, deserialize_with = "de::flag")]
    pub enabled: bool,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub sort_order: bool,
    #[serde(default)]
    pub position_type: Option<String>,
    /// Points per unit, from the league's stat modifiers. Points leagues only.
    #[serde(skip)]
    pub modifier: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct StatModifier {
    #[serde(deserialize_with = "de::lenient_u32")]
    stat_id: u32,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueSettings {
    #[serde(default)]
    pub draft_type: Option<String>,
    #[serde(default)]
    pub scoring_type: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub uses_playoff: bool,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub playoff_start_week: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub num_playoff_teams: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub max_teams: Option<u32>,
    #[serde(default)]
    pub trade_end_date: Option<String>,
    pub roster_positions: Vec<LeagueRosterPosition>,
    pub stat_categories: Vec<LeagueStatCategory>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeagueSettings {
    /// `{"league": [meta, {"settings": [{..}]}]}`
    pub(crate) fn from_response(data: &Value) -> Result<Self> {
        let (_, payload) = decode::unwrap_tuple(data, "league", 1)?;
        let settings = decode::require(payload, "settings")?;
        let settings = match settings {
            Value::Array(_) => decode::element(settings, 0)?,
            other => other,
        };
        Self::from_wire(settings)
    }

    /// Unwraps `roster_positions`, `stat_categories.stats` and folds
    /// `stat_modifiers` into the matching categories.
    pub(crate) fn from_wire(raw: &Value) -> Result<Self> {
        let mut fields = object("settings", raw)?;

        let roster_positions = decode::flatten_field_array(
            decode::require(raw, "roster_positions")?,
            "roster_position",
        )?
        .into_iter()
        .cloned()
        .collect();
        fields.insert("roster_positions".to_string(), Value::Array(roster_positions));

        let stat_categories = decode::flatten_field_array(
            decode::require(decode::require(raw, "stat_categories")?, "stats")?,
            "stat",
        )?
        .into_iter()
        .cloned()
        .collect();
        fields.insert("stat_categories".to_string(), Value::Array(stat_categories));

        let mut modifiers = BTreeMap::new();
        if let Some(stat_modifiers) = fields.remove("stat_modifiers") {
            for stat in decode::flatten_field_array(decode::require(&stat_modifiers, "stats")?, "stat")? {
                let modifier: StatModifier = serde_json::from_value(stat.clone())
                    .map_err(|e| YahooError::decode(format!("stat modifier: {e}")))?;
                if let Some(value) = modifier.value {
                    modifiers.insert(modifier.stat_id, value);
                }
            }
        }

        let mut settings: LeagueSettings = from_fields("settings", fields)?;
        for category in &mut settings.stat_categories {
            category.modifier = modifiers.get(&category.stat_id).copied();
        }
        Ok(settings)
    }

    pub fn stat_category(&self, stat_id: u32) -> Result<&LeagueStatCategory> {
        self.stat_categories
            .iter()
            .find(|c| c.stat_id == stat_id)
            .ok_or_else(|| YahooError::not_found(format!("stat category {stat_id}")))
    }

    /// Points per unit of a stat, if the league scores it.
    pub fn modifier(&self, stat_id: u32) -> Option<f64> {
        self.stat_categories
            .iter()
            .find(|c| c.stat_id == stat_id)
            .and_then(|c| c.modifier)
    }

    /// Number of starting slots across all roster positions.
    pub fn starting_slots(&self) -> u32 {
        self.roster_positions
            .iter()
            .filter(|p| p.is_starting_position)
            .map(|p| p.count)
            .sum()
    }
}
