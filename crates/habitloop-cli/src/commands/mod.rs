pub mod config;
pub mod habit;
pub mod stats;

use chrono::{DateTime, FixedOffset, Utc};
use habitloop_core::{Config, ValidationError};

/// The instant commands treat as "now", on the configured reference clock.
///
/// `at` is an optional RFC 3339 override; without it the wall clock is used.
pub(crate) fn resolve_now(
    config: &Config,
    at: Option<&str>,
) -> Result<DateTime<FixedOffset>, Box<dyn std::error::Error>> {
    let offset = config.reference_offset()?;
    let now = match at {
        Some(raw) => DateTime::parse_from_rfc3339(raw).map_err(|e| ValidationError::InvalidTimestamp {
            value: raw.to_string(),
            message: e.to_string(),
        })?,
        None => Utc::now().fixed_offset(),
    };
    Ok(now.with_timezone(&offset))
}
