#![allow(clippy::unwrap_used)]

//! Needs `dbus-daemon` on PATH. Run with `cargo test -- --ignored`.

use anyhow::{anyhow, Context, Result};
use datetime_daemon::bus::{DateTimeService, ServiceHandle, ServiceIdentity};
use datetime_daemon::settings::SettingsStore;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use tempfile::tempdir;
use zbus::{Connection, ConnectionBuilder};

const TEST_IDENTITY: ServiceIdentity = ServiceIdentity {
    bus_name: "com.deepin.daemon.DateAndTime",
    object_path: "/com/deepin/daemon/DateAndTime",
    interface_name: "com.deepin.daemon.DateAndTime",
};

/// A throwaway session bus, killed on drop.
struct PrivateBus {
    daemon: Child,
    address: String,
}

impl PrivateBus {
    fn start() -> Result<Self> {
        let mut daemon = Command::new("dbus-daemon")
            .args(["--session", "--nofork", "--print-address"])
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to start dbus-daemon")?;

        let stdout = daemon
            .stdout
            .take()
            .ok_or_else(|| anyhow!("dbus-daemon has no stdout"))?;
        let mut address = String::new();
        BufReader::new(stdout).read_line(&mut address)?;

        Ok(Self {
            daemon,
            address: address.trim().to_string(),
        })
    }

    async fn connect(&self) -> Result<Connection> {
        Ok(ConnectionBuilder::address(self.address.as_str())?
            .build()
            .await?)
    }
}

impl Drop for PrivateBus {
    fn drop(&mut self) {
        let _ = self.daemon.kill();
        let _ = self.daemon.wait();
    }
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs dbus-daemon; run with `cargo test -- --ignored`"]
async fn test_second_instance_cannot_take_the_name() -> Result<()> {
    let bus = PrivateBus::start()?;
    let first = bus.connect().await?;
    let second = bus.connect().await?;

    let temp_dir = tempdir()?;
    let database_url = format!("sqlite:{}", temp_dir.path().join("settings.db").display());
    let store = SettingsStore::open(&database_url, "com.deepin.dde.datetime").await?;

    let owner = ServiceHandle::register(
        first,
        TEST_IDENTITY,
        DateTimeService::new(&store, "UTC".to_string()),
        &store,
    )
    .await?;

    let rival = ServiceHandle::register(
        second,
        TEST_IDENTITY,
        DateTimeService::new(&store, "UTC".to_string()),
        &store,
    )
    .await;

    let message = rival.err().map(|e| e.to_string()).unwrap();
    assert!(message.contains("already owned"));

    // The first owner keeps the name and can claim it again
    owner.claim_name().await?;

    Ok(())
}
