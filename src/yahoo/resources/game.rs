//! A fantasy game with its lookup tables, and the user's leagues in it.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use super::{
    GameInfo, GameStat, GameWeek, League, NamedStat, PlayerStats, PositionType, RosterPosition,
};
use crate::{core::decode, types::GameKey, yahoo::api::FantasyApi, Result, YahooError};

/// A game (sport and season) with its metadata loaded.
#[derive(Debug, Clone)]
pub struct Game {
    pub info: GameInfo,
    /// Keyed by stat id.
    pub stat_categories: BTreeMap<u32, GameStat>,
    /// Keyed by position type code.
    pub position_types: BTreeMap<String, PositionType>,
    /// Keyed by position code.
    pub roster_positions: BTreeMap<String, RosterPosition>,
    /// In week order.
    pub game_weeks: Vec<GameWeek>,
    api: FantasyApi,
}

impl Game {
    /// Decode the game fields and fetch the four lookup tables, one request each.
    pub(crate) async fn load(api: FantasyApi, fields: &Value) -> Result<Self> {
        let info = GameInfo::from_wire(fields)?;
        let base = format!("game/{}", info.game_key);

        let weeks = api.get(&format!("{base}/game_weeks")).await?;
        let game_weeks = decode_game_weeks(&weeks)?;

        let stats = api.get(&format!("{base}/stat_categories")).await?;
        let stat_categories = decode_stat_categories(&stats)?;

        let types = api.get(&format!("{base}/position_types")).await?;
        let position_types = decode_position_types(&types)?;

        let positions = api.get(&format!("{base}/roster_positions")).await?;
        let roster_positions = decode_roster_positions(&positions)?;

        debug!(
            game = %info.game_key,
            weeks = game_weeks.len(),
            stats = stat_categories.len(),
            "loaded game metadata"
        );

        Ok(Self {
            info,
            stat_categories,
            position_types,
            roster_positions,
            game_weeks,
            api,
        })
    }

    pub fn key(&self) -> &GameKey {
        &self.info.game_key
    }

    /// Request a sub-resource of this game: `game/<key>/<sub_resource>`.
    pub async fn api_request(&self, sub_resource: &str) -> Result<Value> {
        self.api
            .get(&format!("game/{}/{}", self.info.game_key, sub_resource))
            .await
    }

    /// Leagues the current user belongs to in this game.
    ///
    /// With `active_only`, finished leagues are left out.
    pub async fn get_leagues(&self, active_only: bool) -> Result<Vec<League>> {
        let data = self
            .api
            .get(&format!(
                "users;use_login=1/games;game_keys={}/leagues",
                self.info.game_key
            ))
            .await?;
        decode_user_leagues(&self.api, &data, active_only)
    }

    pub fn stat_category(&self, stat_id: u32) -> Result<&GameStat> {
        self.stat_categories
            .get(&stat_id)
            .ok_or_else(|| YahooError::not_found(format!("stat {stat_id}")))
    }

    pub fn stat_name(&self, stat_id: u32) -> Result<&str> {
        Ok(&self.stat_category(stat_id)?.name)
    }

    /// Pair each stat value with its category. Stats the game does not list
    /// are skipped.
    pub fn describe_stats(&self, stats: &PlayerStats) -> Vec<NamedStat> {
        stats
            .stats
            .iter()
            .filter_map(|s| {
                let category = self.stat_categories.get(&s.stat_id)?;
                Some(NamedStat {
                    stat_id: s.stat_id,
                    name: category.name.clone(),
                    display_name: category.display_name.clone(),
                    value: s.value.clone(),
                })
            })
            .collect()
    }

    /// The week containing today, if the season is running.
    pub fn current_week(&self) -> Option<&GameWeek> {
        self.game_weeks.iter().find(|w| w.is_current())
    }
}

/// `{"game": [meta, {"game_weeks": {"count": N, "0": {"game_week": {..}}}}]}`
pub(crate) fn decode_game_weeks(data: &Value) -> Result<Vec<GameWeek>> {
    let (_, payload) = decode::unwrap_tuple(data, "game", 1)?;
    let mut weeks = decode::decode_counted_array(decode::require(payload, "game_weeks")?)?
        .into_iter()
        .map(|entry| GameWeek::from_wire(decode::require(entry, "game_week")?))
        .collect::<Result<Vec<_>>>()?;
    weeks.sort_by_key(|w| w.week);
    Ok(weeks)
}

/// `{"game": [meta, {"stat_categories": {"stats": [{"stat": {..}}]}}]}`
pub(crate) fn decode_stat_categories(data: &Value) -> Result<BTreeMap<u32, GameStat>> {
    let (_, payload) = decode::unwrap_tuple(data, "game", 1)?;
    let stats = decode::require(decode::require(payload, "stat_categories")?, "stats")?;
    decode::flatten_field_array(stats, "stat")?
        .into_iter()
        .map(|raw| GameStat::from_wire(raw).map(|stat| (stat.stat_id, stat)))
        .collect()
}

/// `{"game": [meta, {"position_types": [{"position_type": {..}}]}]}`
pub(crate) fn decode_position_types(data: &Value) -> Result<BTreeMap<String, PositionType>> {
    let (_, payload) = decode::unwrap_tuple(data, "game", 1)?;
    decode::flatten_field_array(decode::require(payload, "position_types")?, "position_type")?
        .into_iter()
        .map(|raw| PositionType::from_wire(raw).map(|p| (p.kind.clone(), p)))
        .collect()
}

/// `{"game": [meta, {"roster_positions": [{"roster_position": {..}}]}]}`
pub(crate) fn decode_roster_positions(data: &Value) -> Result<BTreeMap<String, RosterPosition>> {
    let (_, payload) = decode::unwrap_tuple(data, "game", 1)?;
    decode::flatten_field_array(decode::require(payload, "roster_positions")?, "roster_position")?
        .into_iter()
        .map(|raw| RosterPosition::from_wire(raw).map(|p| (p.position.clone(), p)))
        .collect()
}

/// users -> user\[1\].games -> game\[1\].leagues -> league\[0\]
///
/// A game without leagues carries `"leagues": []` or no payload at all.
/// Any other shape of the game entry is a decode error.
pub(crate) fn decode_user_leagues(
    api: &FantasyApi,
    data: &Value,
    active_only: bool,
) -> Result<Vec<League>> {
    let mut leagues = Vec::new();
    for user in decode::decode_counted_array(decode::require(data, "users")?)? {
        let (_, user_data) = decode::unwrap_tuple(user, "user", 1)?;
        for game in decode::decode_counted_array(decode::require(user_data, "games")?)? {
            let parts = decode::require(game, "game")?;
            let game_data = match parts.as_array().map(Vec::as_slice) {
                Some([_meta]) => continue,
                Some([_meta, payload, ..]) => payload,
                Some([]) | None => {
                    return Err(YahooError::decode(format!(
                        "game entry is not a meta/payload sequence: {parts}"
                    )))
                }
            };
            let listing = decode::require(game_data, "leagues")?;
            if listing.as_array().is_some_and(Vec::is_empty) {
                continue;
            }
            for entry in decode::decode_counted_array(listing)? {
                let (_, fields) = decode::unwrap_tuple(entry, "league", 0)?;
                let league = League::from_wire(api.clone(), fields)?;
                if active_only && league.is_finished() {
                    continue;
                }
                leagues.push(league);
            }
        }
    }
    debug!(count = leagues.len(), active_only, "decoded user leagues");
    Ok(leagues)
}
