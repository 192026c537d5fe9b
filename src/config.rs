use std::env;
use std::net::SocketAddr;

use chrono::NaiveTime;
use thiserror::Error;

use crate::models::period::parse_clock_time;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Local time the archive job fires each day.
    pub archive_at: NaiveTime,
    /// Local time the reset job fires each day.
    pub reset_at: NaiveTime,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://timetable.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?;

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            archive_at: time_var("ARCHIVE_AT", "23:59")?,
            reset_at: time_var("RESET_AT", "00:00")?,
        })
    }
}

fn time_var(name: &'static str, default: &str) -> Result<NaiveTime, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    parse_clock_time(raw.trim()).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
