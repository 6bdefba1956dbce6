use anyhow::{anyhow, Result};
use std::env;

/// Which message bus the service registers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    /// The system-wide bus. Needs a bus policy allowing the name.
    System,
    /// The per-login session bus (default).
    Session,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings_database_url: String,
    pub bus: BusKind,
    pub health_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let settings_database_url = settings_database_url_from_env();

        let bus = match env::var("DATETIME_BUS") {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "" | "session" => BusKind::Session,
                "system" => BusKind::System,
                _ => return Err(anyhow!("Invalid DATETIME_BUS")),
            },
            Err(_) => BusKind::Session,
        };

        let health_port = match env::var("HEALTH_PORT") {
            Ok(port_str) if !port_str.trim().is_empty() => Some(
                port_str
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid HEALTH_PORT"))?,
            ),
            _ => None,
        };

        Ok(Config {
            settings_database_url,
            bus,
            health_port,
        })
    }
}

/// Reads only `SETTINGS_DATABASE_URL`, for tools that never touch the bus.
pub fn settings_database_url_from_env() -> String {
    match env::var("SETTINGS_DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => "sqlite:./data/settings.db".to_string(),
    }
}
