use anyhow::Result;
use datetime_daemon::settings::{ChangeOrigin, SettingValue, SettingsError, SettingsStore};
use tempfile::{tempdir, TempDir};
use tokio_test::assert_ok;

const SCHEMA: &str = "com.deepin.dde.datetime";

async fn setup_test_store() -> Result<(SettingsStore, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("settings.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let store = SettingsStore::open(&database_url, SCHEMA).await?;

    Ok((store, temp_dir))
}

#[tokio::test]
async fn test_missing_key_reads_none() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;

    assert_eq!(store.get("is-auto-set").await?, None);
    assert!(!store.contains("is-auto-set").await?);

    Ok(())
}

#[tokio::test]
async fn test_set_and_get_each_type() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;

    store.set("is-24hour", SettingValue::Bool(false)).await?;
    store.set("ntp-interval", SettingValue::Int(-3600)).await?;
    store
        .set("ntp-server", SettingValue::String("pool.ntp.org".to_string()))
        .await?;

    assert_eq!(store.get("is-24hour").await?, Some(SettingValue::Bool(false)));
    assert_eq!(store.get("ntp-interval").await?, Some(SettingValue::Int(-3600)));
    assert_eq!(store.get_as::<String>("ntp-server").await?, Some("pool.ntp.org".to_string()));
    assert!(store.contains("is-24hour").await?);

    Ok(())
}

#[tokio::test]
async fn test_overwrite_replaces_value_and_type() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;

    store.set("is-auto-set", SettingValue::Bool(true)).await?;
    store.set("is-auto-set", SettingValue::Bool(false)).await?;
    assert_eq!(store.get_as::<bool>("is-auto-set").await?, Some(false));

    store.set("is-auto-set", SettingValue::Int(1)).await?;
    assert_eq!(store.list().await?.len(), 1);

    let mismatch = store.get_as::<bool>("is-auto-set").await;
    assert!(matches!(
        mismatch,
        Err(SettingsError::TypeMismatch { expected: "boolean", found: "integer", .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_reset_removes_key() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;

    store.set("is-auto-set", SettingValue::Bool(false)).await?;
    assert!(store.reset("is-auto-set").await?);
    assert_eq!(store.get("is-auto-set").await?, None);

    // Nothing left to remove
    assert!(!store.reset("is-auto-set").await?);

    Ok(())
}

#[tokio::test]
async fn test_schemas_are_isolated() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let other = store.with_schema("com.deepin.dde.other");

    store.set("is-24hour", SettingValue::Bool(false)).await?;

    assert_eq!(other.get("is-24hour").await?, None);
    assert!(other.list().await?.is_empty());
    assert_eq!(store.list().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_values_survive_reopen() -> Result<()> {
    let temp_dir = tempdir()?;
    let database_url = format!("sqlite:{}", temp_dir.path().join("settings.db").display());

    {
        let store = SettingsStore::open(&database_url, SCHEMA).await?;
        store.set("is-24hour", SettingValue::Bool(false)).await?;
        store.close().await;
    }

    let reopened = SettingsStore::open(&database_url, SCHEMA).await?;
    assert_eq!(reopened.get_as::<bool>("is-24hour").await?, Some(false));

    Ok(())
}

#[tokio::test]
async fn test_open_creates_missing_directories() -> Result<()> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("nested").join("dir").join("settings.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let store = SettingsStore::open(&database_url, SCHEMA).await?;
    assert_ok!(store.ping().await);
    assert!(db_path.exists());

    Ok(())
}

#[tokio::test]
async fn test_changes_are_broadcast_with_origin() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let mut changes = store.subscribe();

    store.set("is-24hour", SettingValue::Bool(false)).await?;
    store
        .clone()
        .set_with_origin("is-auto-set", SettingValue::Bool(true), ChangeOrigin::Property)
        .await?;
    store.reset("is-24hour").await?;

    let first = changes.recv().await?;
    assert_eq!(first.key, "is-24hour");
    assert_eq!(first.value, Some(SettingValue::Bool(false)));
    assert_eq!(first.origin, ChangeOrigin::Store);

    let second = changes.recv().await?;
    assert_eq!(second.key, "is-auto-set");
    assert_eq!(second.origin, ChangeOrigin::Property);

    let third = changes.recv().await?;
    assert_eq!(third.key, "is-24hour");
    assert_eq!(third.value, None);

    Ok(())
}

#[tokio::test]
async fn test_write_fails_on_closed_store() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    store.close().await;

    let result = store.set("is-24hour", SettingValue::Bool(false)).await;
    assert!(matches!(result, Err(SettingsError::Database(_))));

    Ok(())
}

#[tokio::test]
async fn test_close_reaches_schema_handles() -> Result<()> {
    let (store, _temp_dir) = setup_test_store().await?;
    let other = store.with_schema("com.deepin.dde.other");
    assert_ok!(other.ping().await);

    // Handles share one pool
    store.close().await;

    assert!(store.ping().await.is_err());
    assert!(other.ping().await.is_err());

    Ok(())
}

#[test]
fn test_decode_rejects_bad_input() {
    assert_eq!(SettingValue::decode("b", "true").ok(), Some(SettingValue::Bool(true)));
    assert_eq!(SettingValue::decode("i", " 42 ").ok(), Some(SettingValue::Int(42)));
    assert_eq!(
        SettingValue::decode("s", " keep spaces ").ok(),
        Some(SettingValue::String(" keep spaces ".to_string()))
    );

    assert!(SettingValue::decode("b", "yes").is_err());
    assert!(SettingValue::decode("i", "4.2").is_err());
    assert!(SettingValue::decode("d", "1.0").is_err());
}
