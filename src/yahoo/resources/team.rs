//! Teams, their managers and rosters.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{from_fields, object, player::Player};
use crate::{
    core::{de, decode},
    types::{CoveragePeriod, TeamKey},
    yahoo::api::FantasyApi,
    Result,
};

/// A person managing a team.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manager {
    #[serde(deserialize_with = "de::lenient_string")]
    pub manager_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_commissioner: bool,
    /// Set when this manager is the user behind the current credentials.
    #[serde(default, deserialize_with = "de::flag")]
    pub is_current_login: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Points for one coverage period.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamPoints {
    #[serde(default)]
    pub coverage_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub week: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutcomeTotals {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub wins: u32,
    #[serde(deserialize_with = "de::lenient_u32")]
    pub losses: u32,
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub ties: u32,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub percentage: Option<f64>,
}

/// A team's place in the league table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamStandings {
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub playoff_seed: Option<u32>,
    #[serde(default)]
    pub outcome_totals: Option<OutcomeTotals>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub points_for: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub points_against: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamInfo {
    pub team_key: TeamKey,
    #[serde(deserialize_with = "de::lenient_string")]
    pub team_id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub waiver_priority: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub number_of_moves: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub number_of_trades: Option<u32>,
    pub managers: Vec<Manager>,
    /// Present in scoreboard and standings payloads.
    #[serde(default, rename = "team_points")]
    pub points: Option<TeamPoints>,
    #[serde(default, rename = "team_projected_points")]
    pub projected_points: Option<TeamPoints>,
    /// Present in standings payloads.
    #[serde(default, rename = "team_standings")]
    pub standings: Option<TeamStandings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fantasy team in a league.
#[derive(Debug, Clone)]
pub struct Team {
    pub info: TeamInfo,
    api: FantasyApi,
}

impl Team {
    /// Build from an already flattened field map.
    ///
    /// `managers: [{"manager": {..}}, ..]` is unwrapped into [`Manager`]s.
    pub(crate) fn from_fields(api: FantasyApi, mut fields: Map<String, Value>) -> Result<Self> {
        if let Some(managers) = fields.get("managers") {
            let unwrapped = decode::flatten_field_array(managers, "manager")?
                .into_iter()
                .cloned()
                .collect();
            fields.insert("managers".to_string(), Value::Array(unwrapped));
        }
        Ok(Self {
            info: from_fields("team", fields)?,
            api,
        })
    }

    /// Build from the value under a `"team"` key: `[[{..}, {..}, []], {"team_points": ..}, ..]`.
    pub(crate) fn from_wire(api: FantasyApi, raw: &Value) -> Result<Self> {
        Self::from_fields(api, decode::merge_mixed(raw)?)
    }

    pub fn key(&self) -> &TeamKey {
        &self.info.team_key
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn managers(&self) -> &[Manager] {
        &self.info.managers
    }

    /// Whether any manager of this team is the current login.
    pub fn is_current_login(&self) -> bool {
        self.info.managers.iter().any(|m| m.is_current_login)
    }

    /// Request a sub-resource of this team: `team/<key>/<sub_resource>`.
    pub async fn api_request(&self, sub_resource: &str) -> Result<Value> {
        self.api
            .get(&format!("team/{}/{}", self.info.team_key, sub_resource))
            .await
    }

    /// The roster for one week, one day, or whatever is current.
    pub async fn get_roster(&self, period: CoveragePeriod) -> Result<Roster> {
        let data = self.api_request(&period.roster_resource()).await?;
        let (_, payload) = decode::unwrap_tuple(&data, "team", 1)?;
        Roster::from_wire(&self.api, decode::require(payload, "roster")?)
    }
}

/// Players on a team for one coverage period, in source order.
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub coverage_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub week: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_editable: bool,
    #[serde(skip)]
    pub players: Vec<Player>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Roster {
    /// `{"coverage_type": .., "0": {"players": {"count": N, "0": {"player": ..}}}}`
    pub(crate) fn from_wire(api: &FantasyApi, raw: &Value) -> Result<Self> {
        let mut fields = object("roster", raw)?;
        let listing = fields
            .remove("0")
            .ok_or_else(|| crate::YahooError::decode("roster has no player listing"))?;

        let mut players = Vec::new();
        for entry in decode::decode_counted_array(decode::require(&listing, "players")?)? {
            players.push(Player::from_wire(api.clone(), decode::require(entry, "player")?)?);
        }
        debug!(count = players.len(), "decoded roster");

        let mut roster: Roster = from_fields("roster", fields)?;
        roster.players = players;
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
