//! Type-safe wrappers for Fantasy API identifiers and query periods.

pub mod keys;
pub mod period;

pub use keys::{GameKey, LeagueKey, PlayerKey, TeamKey};
pub use period::CoveragePeriod;
