//! Resource keys.
//!
//! Keys are the dotted identifiers the API uses in request paths, e.g.
//! `nfl` or `423` for a game, `423.l.12345` for a league,
//! `423.l.12345.t.3` for a team and `423.p.30123` for a player.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! resource_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_string())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

resource_key!(
    /// A fantasy game (sport and season), e.g. `nfl` or `423`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yahoo_fantasy::GameKey;
    ///
    /// let key = GameKey::new("nfl");
    /// assert_eq!(key.to_string(), "nfl");
    /// ```
    GameKey
);
resource_key!(
    /// A league inside a game, e.g. `423.l.12345`.
    LeagueKey
);
resource_key!(TeamKey);
resource_key!(PlayerKey);

impl PlayerKey {
    /// `<game>.p.<player_id>`.
    pub fn for_game(game: &GameKey, player_id: u32) -> Self {
        Self(format!("{game}.p.{player_id}"))
    }
}

impl LeagueKey {
    /// `<game>.l.<league_id>`.
    pub fn for_game(game: &GameKey, league_id: u32) -> Self {
        Self(format!("{game}.l.{league_id}"))
    }
}
