//! Leagues, their teams, matchups and standings.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::form_urlencoded;

use super::{from_fields, object, LeagueSettings, Player, Team};
use crate::{
    core::{de, decode},
    types::{LeagueKey, TeamKey},
    yahoo::api::FantasyApi,
    Result, YahooError,
};

/// League metadata as returned by `league/<key>` and league listings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueInfo {
    pub league_key: LeagueKey,
    #[serde(deserialize_with = "de::lenient_string")]
    pub league_id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub num_teams: Option<u32>,
    #[serde(default)]
    pub scoring_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub current_week: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub start_week: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub end_week: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub season: Option<u32>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_finished: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A league the current user can see.
#[derive(Debug, Clone)]
pub struct League {
    pub info: LeagueInfo,
    api: FantasyApi,
}

/// A league together with its settings, once they have been fetched.
#[derive(Debug, Clone)]
pub struct ConfiguredLeague {
    pub league: League,
    pub settings: LeagueSettings,
}

impl League {
    pub(crate) fn from_wire(api: FantasyApi, raw: &Value) -> Result<Self> {
        Ok(Self {
            info: from_fields("league", object("league", raw)?)?,
            api,
        })
    }

    pub fn key(&self) -> &LeagueKey {
        &self.info.league_key
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn is_finished(&self) -> bool {
        self.info.is_finished
    }

    /// Request a sub-resource of this league: `league/<key>/<sub_resource>`.
    pub async fn api_request(&self, sub_resource: &str) -> Result<Value> {
        self.api
            .get(&format!("league/{}/{}", self.info.league_key, sub_resource))
            .await
    }

    /// Every team in the league, in source order.
    pub async fn get_teams(&self) -> Result<Vec<Team>> {
        let data = self.api_request("teams").await?;
        decode_teams(&self.api, &data)
    }

    /// The team managed by the current login.
    ///
    /// When several teams claim the current login the first one wins.
    pub async fn get_team(&self) -> Result<Team> {
        current_login_team(self.get_teams().await?)
    }

    pub async fn get_players(&self) -> Result<Vec<Player>> {
        let data = self.api_request("players").await?;
        decode_players(&self.api, &data)
    }

    /// Players whose name matches `name`, as ranked by the search endpoint.
    pub async fn find_player(&self, name: &str) -> Result<Vec<Player>> {
        let search: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
        let data = self.api_request(&format!("players;search={search}")).await?;
        decode_players(&self.api, &data)
    }

    /// Matchups for `week`, or the current week when `None`.
    pub async fn scoreboard(&self, week: Option<u16>) -> Result<Vec<Matchup>> {
        let sub_resource = match week {
            Some(week) => format!("scoreboard;week={week}"),
            None => "scoreboard".to_string(),
        };
        let data = self.api_request(&sub_resource).await?;
        decode_scoreboard(&self.api, &data)
    }

    /// Teams in standings order, each with [`TeamInfo::standings`] populated.
    ///
    /// [`TeamInfo::standings`]: super::TeamInfo::standings
    pub async fn standings(&self) -> Result<Vec<Team>> {
        let data = self.api_request("standings").await?;
        decode_standings(&self.api, &data)
    }

    pub async fn settings(&self) -> Result<LeagueSettings> {
        let data = self.api_request("settings").await?;
        LeagueSettings::from_response(&data)
    }

    /// Fetch settings and pair them with this league.
    pub async fn with_settings(self) -> Result<ConfiguredLeague> {
        let settings = self.settings().await?;
        Ok(ConfiguredLeague {
            league: self,
            settings,
        })
    }
}

impl ConfiguredLeague {
    pub fn key(&self) -> &LeagueKey {
        self.league.key()
    }
}

/// One head-to-head pairing on a scoreboard.
#[derive(Debug, Clone, Deserialize)]
pub struct Matchup {
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub week: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_playoffs: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_tied: bool,
    #[serde(default)]
    pub winner_team_key: Option<TeamKey>,
    #[serde(skip)]
    pub teams: Vec<Team>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Matchup {
    /// `{"week": .., "0": {"teams": {"count": 2, "0": {"team": ..}, ..}}}`
    pub(crate) fn from_wire(api: &FantasyApi, raw: &Value) -> Result<Self> {
        let mut fields = object("matchup", raw)?;
        let listing = fields
            .remove("0")
            .ok_or_else(|| YahooError::decode("matchup has no team listing"))?;

        let mut teams = Vec::new();
        for entry in decode::decode_counted_array(decode::require(&listing, "teams")?)? {
            teams.push(Team::from_wire(api.clone(), decode::require(entry, "team")?)?);
        }

        let mut matchup: Matchup = from_fields("matchup", fields)?;
        matchup.teams = teams;
        Ok(matchup)
    }

    pub fn winner(&self) -> Option<&Team> {
        let key = self.winner_team_key.as_ref()?;
        self.teams.iter().find(|t| t.key() == key)
    }
}

/// The first team whose managers include the current login.
pub(crate) fn current_login_team(teams: Vec<Team>) -> Result<Team> {
    teams
        .into_iter()
        .find(Team::is_current_login)
        .ok_or_else(|| YahooError::not_found("team managed by the current login"))
}

/// `{"league": [meta, {"teams": {"count": N, "0": {"team": [[..]]}, ..}}]}`
pub(crate) fn decode_teams(api: &FantasyApi, data: &Value) -> Result<Vec<Team>> {
    let (_, payload) = decode::unwrap_tuple(data, "league", 1)?;
    let mut teams = Vec::new();
    for entry in decode::decode_counted_array(decode::require(payload, "teams")?)? {
        let (fields, _) = decode::unwrap_tuple(entry, "team", 0)?;
        teams.push(Team::from_fields(api.clone(), decode::flatten_keyed_array(fields)?)?);
    }
    debug!(count = teams.len(), "decoded league teams");
    Ok(teams)
}

/// `{"league": [meta, {"players": {"count": N, "0": {"player": [[..]]}, ..}}]}`
///
/// A search without hits returns `"players": []`.
pub(crate) fn decode_players(api: &FantasyApi, data: &Value) -> Result<Vec<Player>> {
    let (_, payload) = decode::unwrap_tuple(data, "league", 1)?;
    let listing = decode::require(payload, "players")?;
    if listing.as_array().is_some_and(Vec::is_empty) {
        return Ok(Vec::new());
    }

    let mut players = Vec::new();
    for entry in decode::decode_counted_array(listing)? {
        players.push(Player::from_wire(api.clone(), decode::require(entry, "player")?)?);
    }
    debug!(count = players.len(), "decoded league players");
    Ok(players)
}

/// `{"league": [meta, {"scoreboard": {"week": .., "0": {"matchups": {..}}}}]}`
///
/// Older responses put `matchups` directly under `scoreboard`.
pub(crate) fn decode_scoreboard(api: &FantasyApi, data: &Value) -> Result<Vec<Matchup>> {
    let (_, payload) = decode::unwrap_tuple(data, "league", 1)?;
    let scoreboard = decode::require(payload, "scoreboard")?;
    let matchups = match scoreboard.get("matchups") {
        Some(matchups) => matchups,
        None => decode::require(decode::require(scoreboard, "0")?, "matchups")?,
    };

    let mut decoded = Vec::new();
    for entry in decode::decode_counted_array(matchups)? {
        decoded.push(Matchup::from_wire(api, decode::require(entry, "matchup")?)?);
    }
    debug!(count = decoded.len(), "decoded scoreboard");
    Ok(decoded)
}

/// `{"league": [meta, {"standings": [{"teams": {..}}]}]}`
pub(crate) fn decode_standings(api: &FantasyApi, data: &Value) -> Result<Vec<Team>> {
    let (_, payload) = decode::unwrap_tuple(data, "league", 1)?;
    let standings = decode::element(decode::require(payload, "standings")?, 0)?;

    let mut teams = Vec::new();
    for entry in decode::decode_counted_array(decode::require(standings, "teams")?)? {
        teams.push(Team::from_wire(api.clone(), decode::require(entry, "team")?)?);
    }
    debug!(count = teams.len(), "decoded standings");
    Ok(teams)
}
