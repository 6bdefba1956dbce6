//! # Date/Time Daemon Main Entry Point
//!
//! Initializes logging, loads configuration, opens the settings store,
//! connects to the bus, takes the timezone snapshot, registers the
//! date/time object and then serves bus requests until the process dies.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zbus::Connection;

use datetime_daemon::bus::{DateTimeService, ServiceHandle, DATE_TIME_IDENTITY, DATE_TIME_SCHEMA};
use datetime_daemon::config::{BusKind, Config};
use datetime_daemon::services::health::HealthService;
use datetime_daemon::services::timezone::TimedatedMechanism;
use datetime_daemon::settings::SettingsStore;

// Property reads await SQLite inside zbus dispatch; keep the multi-thread runtime
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datetime_daemon=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting datetime-daemon v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Settings: {}, Bus: {:?}",
        config.settings_database_url, config.bus
    );

    info!("Opening settings store...");
    let store = SettingsStore::open(&config.settings_database_url, DATE_TIME_SCHEMA)
        .await
        .with_context(|| format!("Failed to open settings store {}", config.settings_database_url))?;

    info!("Connecting to the {:?} bus...", config.bus);
    let connection = match config.bus {
        BusKind::System => Connection::system().await,
        BusKind::Session => Connection::session().await,
    }
    .with_context(|| format!("Failed to connect to the {:?} bus", config.bus))?;

    // timedated always lives on the system bus
    let mechanism = match config.bus {
        BusKind::System => TimedatedMechanism::new(connection.clone()),
        BusKind::Session => TimedatedMechanism::system(),
    };
    let service = DateTimeService::with_mechanism(&store, &mechanism).await;
    info!("Current timezone: '{}'", service.time_zone_snapshot());

    let handle = ServiceHandle::register(connection, DATE_TIME_IDENTITY, service, &store)
        .await
        .context("Failed to register the date/time object")?;
    info!(
        "Registered {} at {}",
        DATE_TIME_IDENTITY.bus_name, DATE_TIME_IDENTITY.object_path
    );

    if let Some(port) = config.health_port {
        let health_service = HealthService::new(store.clone(), DATE_TIME_IDENTITY);
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", port, e))?;

        info!("Health check server starting on port {}", port);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, health_service.router).await {
                tracing::error!("Health server error: {}", e);
            }
        });
    }

    handle.run_forever().await
}
