//! Completion rate since habit creation.
//!
//! The rate is the share of periods, from the creation period through the
//! current period inclusive, that contain at least one completion.

use chrono::{DateTime, TimeZone};

use crate::period::{period_key, periods_between, Cadence};
use crate::streak::distinct_period_keys;

/// Number of periods from the one containing `created_at` through the one
/// containing `now`, inclusive, on `now`'s clock. Never less than 1.
pub fn total_periods<Tz: TimeZone>(
    created_at: &DateTime<Tz>,
    now: &DateTime<Tz>,
    cadence: Cadence,
) -> u32 {
    let created_at = created_at.with_timezone(&now.timezone());
    let elapsed = periods_between(period_key(now, cadence), period_key(&created_at, cadence), cadence);
    u32::try_from(elapsed.saturating_add(1)).unwrap_or(0).max(1)
}

/// Percentage of periods with at least one completion, rounded to the
/// nearest integer and clamped to `0..=100`.
///
/// All instants are bucketed on `now`'s clock. Completions outside
/// `[created_at's period, now's period]` are not counted.
pub fn completion_rate<Tz: TimeZone>(
    completions: &[DateTime<Tz>],
    created_at: &DateTime<Tz>,
    cadence: Cadence,
    now: &DateTime<Tz>,
) -> u8 {
    let tz = now.timezone();
    let first = period_key(&created_at.with_timezone(&tz), cadence);
    let last = period_key(now, cadence);
    let total = u64::from(total_periods(created_at, now, cadence));

    let completed = distinct_period_keys(completions, cadence, &tz)
        .into_iter()
        .filter(|key| *key >= first && *key <= last)
        .count() as u64;

    // round half up: (2 * 100 * c + t) / (2 * t)
    let rate = (200 * completed + total) / (2 * total);
    tracing::debug!(%cadence, completed, total, rate, "computed completion rate");
    rate.min(100) as u8
}
