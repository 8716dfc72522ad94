//! Calendar period bucketing.
//!
//! Every instant belongs to exactly one period of a habit's cadence:
//! - **Daily**: local midnight to the last instant before the next midnight
//! - **Weekly**: local midnight of the Monday on or before the instant to the
//!   last instant of the following Sunday
//!
//! The time zone carried by the instant is the reference clock. Periods are
//! identified by their *key*, the calendar date their start falls on, so that
//! gap arithmetic is not thrown off by days that are 23 or 25 hours long.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Recurrence granularity of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cadence {
    #[default]
    #[serde(alias = "daily", alias = "Daily")]
    Daily,
    #[serde(alias = "weekly", alias = "Weekly")]
    Weekly,
}

impl Cadence {
    /// Length of one period in calendar days.
    pub fn days(self) -> i64 {
        match self {
            Cadence::Daily => 1,
            Cadence::Weekly => 7,
        }
    }

    /// How the current period is referred to in user-facing messages.
    pub fn current_period_label(self) -> &'static str {
        match self {
            Cadence::Daily => "today",
            Cadence::Weekly => "this week",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cadence::Daily => "DAILY",
            Cadence::Weekly => "WEEKLY",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            other => Err(format!("unknown cadence: {other} (expected daily or weekly)")),
        }
    }
}

/// A closed interval `[start, end]` covering one cadence period.
#[derive(Debug, Clone, PartialEq)]
pub struct Period<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> Period<Tz> {
    /// Whether `instant` falls inside this period (both ends inclusive).
    pub fn contains<Tz2: TimeZone>(&self, instant: &DateTime<Tz2>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

/// Calendar date on which the period containing `instant` starts.
pub fn period_key<Tz: TimeZone>(instant: &DateTime<Tz>, cadence: Cadence) -> NaiveDate {
    key_for_date(instant.date_naive(), cadence)
}

fn key_for_date(date: NaiveDate, cadence: Cadence) -> NaiveDate {
    match cadence {
        Cadence::Daily => date,
        Cadence::Weekly => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
    }
}

/// Start of the period containing `instant`.
pub fn period_start<Tz: TimeZone>(instant: &DateTime<Tz>, cadence: Cadence) -> DateTime<Tz> {
    local_midnight(&instant.timezone(), period_key(instant, cadence))
}

/// Last instant of the period containing `instant`.
pub fn period_end<Tz: TimeZone>(instant: &DateTime<Tz>, cadence: Cadence) -> DateTime<Tz> {
    let next_key = period_key(instant, cadence) + Duration::days(cadence.days());
    local_midnight(&instant.timezone(), next_key) - Duration::nanoseconds(1)
}

/// The full period containing `instant`.
pub fn period_of<Tz: TimeZone>(instant: &DateTime<Tz>, cadence: Cadence) -> Period<Tz> {
    Period {
        start: period_start(instant, cadence),
        end: period_end(instant, cadence),
    }
}

/// Start of the period immediately before the one starting at `start`.
pub fn previous_period_start<Tz: TimeZone>(start: &DateTime<Tz>, cadence: Cadence) -> DateTime<Tz> {
    period_start(&(start.clone() - Duration::nanoseconds(1)), cadence)
}

/// Whether two instants fall into the same period.
pub fn same_period<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>, cadence: Cadence) -> bool {
    period_key(a, cadence) == period_key(b, cadence)
}

/// Whole periods from `earlier` to `later` (both period keys).
///
/// Adjacent periods are 1 apart; the result is negative when `later` is
/// actually the earlier key.
pub fn periods_between(later: NaiveDate, earlier: NaiveDate, cadence: Cadence) -> i64 {
    (later - earlier).num_days().div_euclid(cadence.days())
}

/// Resolve local midnight of `date` in `tz`.
///
/// Ambiguous midnights take the earlier instant. A midnight skipped by a DST
/// transition resolves to the first valid local time that day.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
        return dt;
    }
    (1..=24)
        .map(|step| midnight + Duration::minutes(step * 15))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}
