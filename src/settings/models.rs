use std::fmt;

use sqlx::FromRow;

use super::error::SettingsError;

/// A typed value held by the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl SettingValue {
    /// One-letter type tag persisted next to the encoded value.
    pub fn type_tag(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "b",
            SettingValue::Int(_) => "i",
            SettingValue::String(_) => "s",
        }
    }

    pub fn type_name(&self) -> &'static str {
        type_name_for_tag(self.type_tag())
    }

    pub fn encode(&self) -> String {
        match self {
            SettingValue::Bool(value) => value.to_string(),
            SettingValue::Int(value) => value.to_string(),
            SettingValue::String(value) => value.clone(),
        }
    }

    /// Rebuilds a value from its type tag and textual encoding.
    pub fn decode(type_tag: &str, raw: &str) -> Result<Self, SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            value_type: type_tag.to_string(),
            value: raw.to_string(),
        };

        match type_tag {
            "b" => match raw.trim() {
                "true" => Ok(SettingValue::Bool(true)),
                "false" => Ok(SettingValue::Bool(false)),
                _ => Err(invalid()),
            },
            "i" => raw.trim().parse().map(SettingValue::Int).map_err(|_| invalid()),
            "s" => Ok(SettingValue::String(raw.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(value) => write!(f, "'{value}'"),
            other => write!(f, "{}", other.encode()),
        }
    }
}

pub(crate) fn type_name_for_tag(type_tag: &str) -> &'static str {
    match type_tag {
        "b" => "boolean",
        "i" => "integer",
        "s" => "string",
        _ => "unknown",
    }
}

/// Rust types that can live in the settings store.
pub trait StoredValue: Sized + Clone + Send + Sync + 'static {
    /// Type name used in mismatch errors.
    const TYPE_NAME: &'static str;

    fn into_setting(self) -> SettingValue;

    fn from_setting(value: &SettingValue) -> Option<Self>;
}

impl StoredValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn into_setting(self) -> SettingValue {
        SettingValue::Bool(self)
    }

    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl StoredValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn into_setting(self) -> SettingValue {
        SettingValue::Int(self)
    }

    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl StoredValue for String {
    const TYPE_NAME: &'static str = "string";

    fn into_setting(self) -> SettingValue {
        SettingValue::String(self)
    }

    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::String(value) => Some(value.clone()),
            _ => None,
        }
    }
}

/// A persisted row of the `settings` table.
#[derive(Debug, Clone, FromRow)]
pub struct Setting {
    pub namespace: String,
    pub setting_key: String,
    pub value: String,
    pub value_type: String,
    pub updated_at: String,
}

impl Setting {
    pub fn decoded(&self) -> Result<SettingValue, SettingsError> {
        SettingValue::decode(&self.value_type, &self.value)
    }
}

/// Who wrote a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A bound property setter invoked from the bus.
    Property,
    /// Any other writer holding a handle to the store.
    Store,
}

/// Broadcast after every write or reset of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
    /// `None` when the key was reset back to its default.
    pub value: Option<SettingValue>,
    pub origin: ChangeOrigin,
}
