use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("settings migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to prepare settings directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value '{value}' for type tag '{value_type}'")]
    InvalidValue { value_type: String, value: String },

    #[error("setting '{key}' holds a {found} value, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}
