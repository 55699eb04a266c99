//! Resource graph: typed views over decoded payloads.
//!
//! - `meta`: Game-level lookup data (stat categories, weeks, positions)
//! - `game`: A fantasy game and the user's leagues in it
//! - `league`: Leagues, matchups and standings
//! - `settings`: League settings
//! - `team`: Teams, managers and rosters
//! - `player`: Players and their stats
//!
//! Resources that issue follow-up requests hold a [`FantasyApi`] clone.
//! Wire fields without a typed counterpart are kept in `extra` and reachable
//! through [`Resource::get_extra`].
//!
//! [`FantasyApi`]: crate::yahoo::api::FantasyApi

pub mod game;
pub mod league;
pub mod meta;
pub mod player;
pub mod settings;
pub mod team;


use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{Result, YahooError};

pub use game::Game;
pub use league::{ConfiguredLeague, League, LeagueInfo, Matchup};
pub use meta::{GameInfo, GameStat, GameWeek, PositionType, RosterPosition};
pub use player::{NamedStat, Player, PlayerInfo, PlayerName, PlayerStats, SelectedPosition, StatValue};
pub use settings::{LeagueRosterPosition, LeagueSettings, LeagueStatCategory};
pub use team::{Manager, OutcomeTotals, Roster, Team, TeamInfo, TeamPoints, TeamStandings};

/// Field access shared by every resource.
pub trait Resource {
    /// Wire fields that have no typed accessor.
    fn extra(&self) -> &Map<String, Value>;

    /// Look up a wire field by name. Absent fields are [`YahooError::NotFound`].
    fn get_extra(&self, name: &str) -> Result<&Value> {
        self.extra()
            .get(name)
            .ok_or_else(|| YahooError::not_found(format!("field `{name}`")))
    }
}

macro_rules! impl_resource {
    ($($ty:ty => $($field:ident).+),* $(,)?) => {
        $(
            impl Resource for $ty {
                fn extra(&self) -> &Map<String, Value> {
                    &self.$($field).+
                }
            }
        )*
    };
}

impl_resource!(
    GameInfo => extra,
    GameStat => extra,
    GameWeek => extra,
    PositionType => extra,
    RosterPosition => extra,
    Game => info.extra,
    LeagueInfo => extra,
    League => info.extra,
    Matchup => extra,
    LeagueSettings => extra,
    LeagueRosterPosition => extra,
    LeagueStatCategory => extra,
    TeamInfo => extra,
    Team => info.extra,
    Manager => extra,
    Roster => extra,
    TeamStandings => extra,
    PlayerInfo => extra,
    Player => info.extra,
    SelectedPosition => extra,
    PlayerStats => extra,
);

/// Deserialize a normalized field map, reporting shape mismatches as decode errors.
pub(crate) fn from_fields<T: DeserializeOwned>(what: &str, fields: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| YahooError::decode(format!("{what}: {e}")))
}

/// A map payload, owned.
pub(crate) fn object(what: &str, raw: &Value) -> Result<Map<String, Value>> {
    raw.as_object()
        .cloned()
        .ok_or_else(|| YahooError::decode(format!("{what} is not a map")))
}
