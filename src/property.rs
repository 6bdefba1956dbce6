//! Bus-visible values whose storage lives in the settings store.

use crate::settings::{ChangeOrigin, SettingChange, SettingsError, SettingsStore, StoredValue};
use crate::utils::logging::{log_property_read, log_property_write, log_settings_fallback};

/// A property exposed on the bus and persisted under a settings key.
///
/// Reads return the stored value, or `default` when the key was never set
/// or holds something unreadable. Writes go straight to the store.
#[derive(Clone)]
pub struct BoundProperty<T: StoredValue> {
    store: SettingsStore,
    key: &'static str,
    default: T,
    name: &'static str,
}

impl<T: StoredValue + std::fmt::Debug> BoundProperty<T> {
    pub fn new(store: SettingsStore, key: &'static str, default: T, name: &'static str) -> Self {
        Self {
            store,
            key,
            default,
            name,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub async fn get(&self) -> T {
        let value = match self.store.get_as::<T>(self.key).await {
            Ok(Some(value)) => value,
            Ok(None) => self.default.clone(),
            Err(e) => {
                log_settings_fallback(self.store.schema(), self.key, &e.to_string());
                self.default.clone()
            }
        };

        log_property_read(self.name, &format!("{value:?}"));
        value
    }

    pub async fn set(&self, value: T) -> Result<(), SettingsError> {
        log_property_write(self.name, &format!("{value:?}"));
        self.store
            .set_with_origin(self.key, value.into_setting(), ChangeOrigin::Property)
            .await
    }

    /// Whether `change` touched the key backing this property.
    pub fn is_affected_by(&self, change: &SettingChange) -> bool {
        change.key == self.key
    }
}
