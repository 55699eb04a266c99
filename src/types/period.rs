//! Coverage periods for roster and stats queries.

use chrono::NaiveDate;
use std::fmt;

use crate::core::de::DATE_FORMAT;

/// Which slice of the season a roster or stats query covers.
///
/// A query names at most one of a week or a date, so the choice is a single
/// enum rather than two optional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoveragePeriod {
    /// Whatever the service considers current. Adds no parameter.
    #[default]
    Current,
    /// A scoring week (weekly sports such as NFL).
    Week(u16),
    /// A calendar day (daily sports such as MLB, NBA, NHL).
    Date(NaiveDate),
}

impl CoveragePeriod {
    /// Roster sub-resource: `roster`, `roster;week=3`, `roster;date=2024-04-01`.
    pub fn roster_resource(&self) -> String {
        match self {
            CoveragePeriod::Current => "roster".to_string(),
            CoveragePeriod::Week(week) => format!("roster;week={week}"),
            CoveragePeriod::Date(date) => format!("roster;date={}", date.format(DATE_FORMAT)),
        }
    }

    /// Stats sub-resource: `stats`, `stats;type=week;week=3`, `stats;type=date;date=..`.
    pub fn stats_resource(&self) -> String {
        match self {
            CoveragePeriod::Current => "stats".to_string(),
            CoveragePeriod::Week(week) => format!("stats;type=week;week={week}"),
            CoveragePeriod::Date(date) => {
                format!("stats;type=date;date={}", date.format(DATE_FORMAT))
            }
        }
    }
}

impl fmt::Display for CoveragePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoveragePeriod::Current => write!(f, "current"),
            CoveragePeriod::Week(week) => write!(f, "week {week}"),
            CoveragePeriod::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}

impl From<u16> for CoveragePeriod {
    fn from(week: u16) -> Self {
        CoveragePeriod::Week(week)
    }
}

impl From<NaiveDate> for CoveragePeriod {
    fn from(date: NaiveDate) -> Self {
        CoveragePeriod::Date(date)
    }
}
