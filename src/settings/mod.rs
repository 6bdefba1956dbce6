//! Namespaced, SQLite-backed settings that survive restarts.

pub mod error;
pub mod models;
pub mod store;

pub use error::SettingsError;
pub use models::{ChangeOrigin, Setting, SettingChange, SettingValue, StoredValue};
pub use store::SettingsStore;
