mod config;
pub mod database;
pub mod migrations;

pub use config::{ClockConfig, Config, HabitsConfig, StreakConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `HABITLOOP_DATA_DIR` overrides the location. Otherwise this is
/// `~/.config/habitloop[-dev]/`, with the `-dev` suffix when
/// `HABITLOOP_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITLOOP_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HABITLOOP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitloop-dev")
            } else {
                base_dir.join("habitloop")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
