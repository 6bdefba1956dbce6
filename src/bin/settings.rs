use anyhow::{anyhow, Result};
use datetime_daemon::bus::DATE_TIME_SCHEMA;
use datetime_daemon::config::settings_database_url_from_env;
use datetime_daemon::settings::{SettingValue, SettingsStore};
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize basic logging for the admin tool
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");
    let rest = &args[args.len().min(2)..];

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_store().await,
        "list" => list_settings().await,
        "get" => get_setting(rest).await,
        "set" => set_setting(rest).await,
        "reset" => reset_setting(rest).await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn open_store() -> Result<SettingsStore> {
    dotenvy::dotenv().ok();
    let database_url = settings_database_url_from_env();

    println!("📊 Settings URL: {}", mask_url(&database_url));

    SettingsStore::open(&database_url, DATE_TIME_SCHEMA)
        .await
        .map_err(|e| anyhow!("Failed to open settings store: {}", e))
}

async fn run_migrations() -> Result<()> {
    println!("🔧 datetime-daemon - Settings Store Tool");
    println!("========================================");

    // Opening the store creates the file and applies migrations
    open_store().await?;
    println!("✅ Settings store is ready (schema {DATE_TIME_SCHEMA})");

    Ok(())
}

async fn check_store() -> Result<()> {
    println!("🔍 Checking settings store...");

    let store = open_store().await?;
    match store.ping().await {
        Ok(()) => {
            let settings = store.list().await?;
            println!("✅ Settings store reachable");
            println!("📋 {} key(s) stored under {}", settings.len(), store.schema());
        }
        Err(e) => {
            println!("⚠️  Settings store check failed: {e}");
        }
    }

    Ok(())
}

async fn list_settings() -> Result<()> {
    let store = open_store().await?;
    let settings = store.list().await?;

    if settings.is_empty() {
        println!("(no keys set, every property reads its default)");
    }
    for setting in settings {
        match setting.decoded() {
            Ok(value) => println!(
                "  • {} = {} ({}, updated {})",
                setting.setting_key,
                value,
                value.type_name(),
                setting.updated_at
            ),
            Err(e) => println!("  • {} = <unreadable: {e}>", setting.setting_key),
        }
    }

    Ok(())
}

async fn get_setting(args: &[String]) -> Result<()> {
    let key = args.first().ok_or_else(|| anyhow!("Usage: get <key>"))?;
    let store = open_store().await?;

    match store.get(key).await? {
        Some(value) => println!("{key} = {value}"),
        None => println!("{key} is not set"),
    }

    Ok(())
}

async fn set_setting(args: &[String]) -> Result<()> {
    let (key, type_tag, raw) = match args {
        [key, type_tag, raw, ..] => (key, type_tag, raw),
        _ => return Err(anyhow!("Usage: set <key> <b|i|s> <value>")),
    };
    let value = SettingValue::decode(type_tag, raw)?;

    let store = open_store().await?;
    store.set(key, value.clone()).await?;
    println!("✅ {key} = {value}");
    println!("💡 A running daemon picks this up on its next property read");

    Ok(())
}

async fn reset_setting(args: &[String]) -> Result<()> {
    let key = args.first().ok_or_else(|| anyhow!("Usage: reset <key>"))?;
    let store = open_store().await?;

    if store.reset(key).await? {
        println!("🗑️  Reset {key} to its default");
    } else {
        println!("{key} was not set");
    }

    Ok(())
}

fn mask_url(url: &str) -> String {
    // Only show the file name of SQLite databases
    if url.starts_with("sqlite:") {
        let path = url.strip_prefix("sqlite:").unwrap_or(url);
        if let Some(filename) = Path::new(path).file_name() {
            format!("sqlite:.../{}", filename.to_string_lossy())
        } else {
            url.to_string()
        }
    } else {
        url.to_string()
    }
}

fn print_help() {
    println!("🕑 datetime-daemon - Settings Store Tool");
    println!();
    println!("USAGE:");
    println!("    datetime-settings [COMMAND] [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up              Create the store and apply migrations (default)");
    println!("    check                    Check the store is reachable");
    println!("    list                     List stored keys");
    println!("    get <key>                Print a stored value");
    println!("    set <key> <b|i|s> <v>    Store a boolean, integer or string");
    println!("    reset <key>              Remove a key so it reads its default");
    println!("    help                     Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    SETTINGS_DATABASE_URL    Settings store URL (default: sqlite:./data/settings.db)");
    println!();
    println!("EXAMPLES:");
    println!("    datetime-settings set is-24hour b false");
    println!("    datetime-settings reset is-auto-set");
    println!();
}
