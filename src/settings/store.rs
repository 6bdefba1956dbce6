use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tokio::sync::broadcast;
use tracing::info;

use super::error::SettingsError;
use super::models::{ChangeOrigin, Setting, SettingChange, SettingValue, StoredValue};
use crate::utils::logging::{log_settings_error, log_settings_operation};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Persistent key-value settings under one schema namespace.
///
/// Clones share the same pool and the same change channel, so a write made
/// through any clone is seen by every subscriber.
#[derive(Clone)]
pub struct SettingsStore {
    pool: SqlitePool,
    schema: Arc<str>,
    changes: broadcast::Sender<SettingChange>,
}

impl SettingsStore {
    /// Opens the store at `database_url`, creating the database file and
    /// its tables when missing.
    pub async fn open(database_url: &str, schema: &str) -> Result<Self, SettingsError> {
        if let Some(path) = sqlite_file_path(database_url) {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    info!("Creating settings directory {}", parent.display());
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating settings database {}", database_url);
            Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;
        let store = Self::with_pool(pool, schema);
        store.run_migrations().await?;

        Ok(store)
    }

    fn with_pool(pool: SqlitePool, schema: &str) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            pool,
            schema: Arc::from(schema),
            changes,
        }
    }

    pub async fn run_migrations(&self) -> Result<(), SettingsError> {
        info!("Running settings migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Another namespace in the same database, with its own change channel.
    pub fn with_schema(&self, schema: &str) -> Self {
        Self::with_pool(self.pool.clone(), schema)
    }

    /// Closes every connection. Later operations fail with a database error.
    pub async fn close(&self) {
        info!("Closing settings store");
        self.pool.close().await;
    }

    /// Receives every change made through this store or its clones from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.changes.subscribe()
    }

    pub async fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        log_settings_operation("GET", &self.schema, key, None);
        let row = self.find(key).await?;
        row.map(|setting| setting.decoded()).transpose()
    }

    /// Reads `key` as `T`. A stored value of another type is an error.
    pub async fn get_as<T: StoredValue>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        match self.get(key).await? {
            Some(value) => match T::from_setting(&value) {
                Some(typed) => Ok(Some(typed)),
                None => Err(SettingsError::TypeMismatch {
                    key: key.to_string(),
                    expected: T::TYPE_NAME,
                    found: value.type_name(),
                }),
            },
            None => Ok(None),
        }
    }

    pub async fn contains(&self, key: &str) -> Result<bool, SettingsError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM settings WHERE namespace = ? AND setting_key = ?",
        )
        .bind(&*self.schema)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    pub async fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.set_with_origin(key, value, ChangeOrigin::Store).await
    }

    pub async fn set_with_origin(
        &self,
        key: &str,
        value: SettingValue,
        origin: ChangeOrigin,
    ) -> Result<(), SettingsError> {
        let encoded = value.encode();
        let details = format!("{} = {}", value.type_name(), value);
        log_settings_operation("SET", &self.schema, key, Some(&details));

        let result = sqlx::query(
            r#"
            INSERT INTO settings (namespace, setting_key, value, value_type, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(namespace, setting_key) DO UPDATE SET
                value = excluded.value,
                value_type = excluded.value_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&*self.schema)
        .bind(key)
        .bind(&encoded)
        .bind(value.type_tag())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            log_settings_error("SET", &self.schema, key, &e.to_string());
            return Err(e.into());
        }

        self.notify(SettingChange {
            key: key.to_string(),
            value: Some(value),
            origin,
        });
        Ok(())
    }

    /// Removes the stored value so readers fall back to their default.
    /// Returns whether anything was stored.
    pub async fn reset(&self, key: &str) -> Result<bool, SettingsError> {
        log_settings_operation("RESET", &self.schema, key, None);

        let result = sqlx::query("DELETE FROM settings WHERE namespace = ? AND setting_key = ?")
            .bind(&*self.schema)
            .bind(key)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.notify(SettingChange {
                key: key.to_string(),
                value: None,
                origin: ChangeOrigin::Store,
            });
        }
        Ok(removed)
    }

    pub async fn list(&self) -> Result<Vec<Setting>, SettingsError> {
        let rows = sqlx::query_as::<_, Setting>(
            "SELECT namespace, setting_key, value, value_type, updated_at FROM settings WHERE namespace = ? ORDER BY setting_key",
        )
        .bind(&*self.schema)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Round-trips a trivial query to check the database is reachable.
    pub async fn ping(&self) -> Result<(), SettingsError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, key: &str) -> Result<Option<Setting>, SettingsError> {
        let row = sqlx::query_as::<_, Setting>(
            "SELECT namespace, setting_key, value, value_type, updated_at FROM settings WHERE namespace = ? AND setting_key = ?",
        )
        .bind(&*self.schema)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    fn notify(&self, change: SettingChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

/// Filesystem path of a `sqlite:` URL, or `None` for in-memory databases.
fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path).to_path_buf())
}
