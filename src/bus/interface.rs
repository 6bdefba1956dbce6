use zbus::{dbus_interface, fdo};

use super::identity::{AUTO_SET_TIME_KEY, TIME_SHOW_FORMAT_KEY};
use crate::property::BoundProperty;
use crate::services::timezone::{snapshot_timezone, TimezoneMechanism};
use crate::settings::SettingsStore;

/// The object served at the date/time path.
///
/// `AutoSetTime` and `TimeShowFormat` are live views of the settings store.
/// `CurrentTimeZone` is captured once at construction and never refreshed.
pub struct DateTimeService {
    auto_set_time: BoundProperty<bool>,
    time_show_format: BoundProperty<bool>,
    current_time_zone: String,
}

impl DateTimeService {
    pub fn new(store: &SettingsStore, current_time_zone: String) -> Self {
        Self {
            auto_set_time: BoundProperty::new(store.clone(), AUTO_SET_TIME_KEY, true, "AutoSetTime"),
            time_show_format: BoundProperty::new(
                store.clone(),
                TIME_SHOW_FORMAT_KEY,
                true,
                "TimeShowFormat",
            ),
            current_time_zone,
        }
    }

    /// Builds the service, taking the timezone snapshot from `mechanism`.
    pub async fn with_mechanism(store: &SettingsStore, mechanism: &dyn TimezoneMechanism) -> Self {
        let current_time_zone = snapshot_timezone(mechanism).await;
        Self::new(store, current_time_zone)
    }

    pub fn auto_set_time_property(&self) -> &BoundProperty<bool> {
        &self.auto_set_time
    }

    pub fn time_show_format_property(&self) -> &BoundProperty<bool> {
        &self.time_show_format
    }

    pub fn time_zone_snapshot(&self) -> &str {
        &self.current_time_zone
    }
}

#[dbus_interface(name = "com.deepin.daemon.DateAndTime")]
impl DateTimeService {
    #[dbus_interface(property)]
    async fn auto_set_time(&self) -> bool {
        self.auto_set_time.get().await
    }

    #[dbus_interface(property)]
    async fn set_auto_set_time(&mut self, value: bool) -> fdo::Result<()> {
        self.auto_set_time
            .set(value)
            .await
            .map_err(|e| fdo::Error::Failed(format!("Failed to persist AutoSetTime: {e}")))
    }

    #[dbus_interface(property)]
    async fn time_show_format(&self) -> bool {
        self.time_show_format.get().await
    }

    #[dbus_interface(property)]
    async fn set_time_show_format(&mut self, value: bool) -> fdo::Result<()> {
        self.time_show_format
            .set(value)
            .await
            .map_err(|e| fdo::Error::Failed(format!("Failed to persist TimeShowFormat: {e}")))
    }

    #[dbus_interface(property)]
    async fn current_time_zone(&self) -> String {
        self.current_time_zone.clone()
    }
}
