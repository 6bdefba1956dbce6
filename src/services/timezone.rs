//! Access to the privileged date-time mechanism that owns the system timezone.

use anyhow::{Context, Result};
use async_trait::async_trait;
use zbus::{dbus_proxy, Connection};

use crate::utils::logging::{log_degraded, log_system_event};

/// Value published when the mechanism could not be reached.
pub const UNKNOWN_TIMEZONE: &str = "";

#[dbus_proxy(
    interface = "org.freedesktop.timedate1",
    default_service = "org.freedesktop.timedate1",
    default_path = "/org/freedesktop/timedate1"
)]
trait Timedate1 {
    #[dbus_proxy(property)]
    fn timezone(&self) -> zbus::Result<String>;
}

/// Source of the current system timezone identifier.
#[async_trait]
pub trait TimezoneMechanism: Send + Sync {
    async fn current_timezone(&self) -> Result<String>;
}

/// Asks systemd-timedated on the system bus.
pub struct TimedatedMechanism {
    connection: Option<Connection>,
}

impl TimedatedMechanism {
    /// Reuses an existing system bus connection.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    /// Opens its own system bus connection on first use.
    pub fn system() -> Self {
        Self { connection: None }
    }
}

#[async_trait]
impl TimezoneMechanism for TimedatedMechanism {
    async fn current_timezone(&self) -> Result<String> {
        let connection = match &self.connection {
            Some(connection) => connection.clone(),
            None => Connection::system()
                .await
                .context("Failed to connect to the system bus")?,
        };

        let proxy = Timedate1Proxy::new(&connection)
            .await
            .context("Failed to create timedate1 proxy")?;
        let timezone = proxy
            .timezone()
            .await
            .context("Failed to read Timezone from timedate1")?;

        Ok(timezone)
    }
}

/// Always answers with the same identifier.
pub struct FixedTimezone(pub String);

#[async_trait]
impl TimezoneMechanism for FixedTimezone {
    async fn current_timezone(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Queries the mechanism once. Failures degrade to [`UNKNOWN_TIMEZONE`].
pub async fn snapshot_timezone(mechanism: &dyn TimezoneMechanism) -> String {
    match mechanism.current_timezone().await {
        Ok(timezone) => {
            log_system_event("Timezone snapshot taken", Some(&timezone));
            timezone
        }
        Err(e) => {
            log_degraded("date-time mechanism", &format!("{e:#}"), UNKNOWN_TIMEZONE);
            UNKNOWN_TIMEZONE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait]
    impl TimezoneMechanism for Unreachable {
        async fn current_timezone(&self) -> Result<String> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_snapshot_uses_mechanism_value() {
        let timezone = snapshot_timezone(&FixedTimezone("Europe/Berlin".to_string())).await;
        assert_eq!(timezone, "Europe/Berlin");
    }

    #[tokio::test]
    async fn test_snapshot_degrades_when_unreachable() {
        let timezone = snapshot_timezone(&Unreachable).await;
        assert_eq!(timezone, UNKNOWN_TIMEZONE);
    }
}
