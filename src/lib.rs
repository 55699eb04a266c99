//! Yahoo Fantasy Sports API client library
//!
//! An async client for the Yahoo Fantasy Sports API. It decodes the API's
//! envelope encodings (counted arrays, flattened single-key arrays and
//! tuple-wrapped resources) into typed resources, and handles OAuth1
//! registration, signing and token refresh.
//!
//! ## Features
//!
//! - **Envelope decoding**: Pure helpers in [`core::decode`] for every wire encoding
//! - **Authenticated requests**: One refresh-and-retry on rejected requests
//! - **Resource graph**: Games, leagues, teams, rosters, players and settings
//! - **Pluggable capabilities**: Transport, authorizer and credential store are traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yahoo_fantasy::{ApiConfig, CoveragePeriod, FantasyApi, GameKey, JsonCredentialStore};
//!
//! # async fn example() -> yahoo_fantasy::Result<()> {
//! let config = ApiConfig::from_env()?;
//! let store = Arc::new(JsonCredentialStore::new(config.credentials_path.clone()));
//! let prompt = Arc::new(|url: &url::Url| -> yahoo_fantasy::Result<String> {
//!     println!("Authorize at {url} and paste the code:");
//!     let mut code = String::new();
//!     std::io::stdin().read_line(&mut code)?;
//!     Ok(code.trim().to_string())
//! });
//! let api = FantasyApi::connect(config, store, prompt)?;
//!
//! let game = api.get_game(&GameKey::new("nfl")).await?;
//! for league in game.get_leagues(true).await? {
//!     let team = league.get_team().await?;
//!     let roster = team.get_roster(CoveragePeriod::Week(1)).await?;
//!     println!("{}: {} players", team.name(), roster.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export YAHOO_FANTASY_AUTH_FILE=~/.config/yahoo-fantasy/auth.json
//! export YAHOO_FANTASY_BASE_URL=https://fantasysports.yahooapis.com/fantasy/v2/
//! ```

pub mod auth;
pub mod core;
pub mod error;
pub mod types;
pub mod yahoo;

// Re-export commonly used types
pub use auth::{Authorizer, CredentialStore, Credentials, JsonCredentialStore, MemoryCredentialStore};
pub use core::{ApiConfig, DEFAULT_BASE_URL};
pub use error::{Result, YahooError};
pub use types::{CoveragePeriod, GameKey, LeagueKey, PlayerKey, TeamKey};
pub use yahoo::api::FantasyApi;
pub use yahoo::http::{HttpRequest, HttpResponse, Transport};
pub use yahoo::resources::{
    ConfiguredLeague, Game, League, LeagueSettings, Matchup, Player, PlayerStats, Resource,
    Roster, Team,
};
