use std::{env, net::SocketAddr, path::PathBuf};

use tracing::info;

use crate::error::AppError;

/// Longest default slot a tutor can be configured with: one day.
pub const MAX_SLOT_MINUTES: i64 = 24 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Length of a published slot when the tutor gives no end time.
    pub slot_minutes: i64,
    pub settings_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://tutoring.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            slot_minutes: 60,
            settings_path: PathBuf::from("settings.json"),
        }
    }
}

impl Config {
    pub fn new_from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("BIND_ADDR {:?} is invalid: {}", raw, e)))?,
            Err(_) => defaults.bind_addr,
        };

        let slot_minutes = match env::var("SLOT_MINUTES") {
            Ok(raw) => parse_slot_minutes(&raw)?,
            Err(_) => defaults.slot_minutes,
        };

        let settings_path = env::var("SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.settings_path);

        info!("configuration loaded (bind: {}, slot length: {} min)", bind_addr, slot_minutes);

        Ok(Self {
            database_url,
            bind_addr,
            slot_minutes,
            settings_path,
        })
    }
}

fn parse_slot_minutes(raw: &str) -> Result<i64, AppError> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("SLOT_MINUTES {:?} is invalid: {}", raw, e)))?;
    if !(1..=MAX_SLOT_MINUTES).contains(&minutes) {
        return Err(AppError::Config(format!(
            "SLOT_MINUTES must be between 1 and {}, got {}",
            MAX_SLOT_MINUTES, minutes
        )));
    }
    Ok(minutes)
}
