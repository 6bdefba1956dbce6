use anyhow::{bail, Context, Result};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zbus::fdo::{DBusProxy, RequestNameFlags, RequestNameReply};
use zbus::names::WellKnownName;
use zbus::{Connection, InterfaceRef};

use super::identity::ServiceIdentity;
use super::interface::DateTimeService;
use crate::settings::{ChangeOrigin, SettingChange, SettingsStore};
use crate::utils::logging::log_system_event;

/// Ownership of the served object and of its bus name.
///
/// Created once at startup and held by `main` for the life of the process.
/// Dropping it does not unregister anything; the process is expected to exit.
pub struct ServiceHandle {
    connection: Connection,
    identity: ServiceIdentity,
    forwarder: JoinHandle<()>,
}

impl ServiceHandle {
    /// Serves `service` at the identity's object path and claims the bus name.
    pub async fn register(
        connection: Connection,
        identity: ServiceIdentity,
        service: DateTimeService,
        store: &SettingsStore,
    ) -> Result<Self> {
        let handle = Self::serve(connection, identity, service, store).await?;
        handle.claim_name().await?;
        Ok(handle)
    }

    /// Serves `service` without requesting a well-known name. Works on
    /// peer-to-peer connections as well as bus connections.
    ///
    /// Requires a multi-thread tokio runtime: property getters await the
    /// settings store from inside zbus's dispatch, which stalls on a
    /// current-thread runtime.
    pub async fn serve(
        connection: Connection,
        identity: ServiceIdentity,
        service: DateTimeService,
        store: &SettingsStore,
    ) -> Result<Self> {
        let changes = store.subscribe();

        let added = connection
            .object_server()
            .at(identity.object_path, service)
            .await
            .with_context(|| format!("Failed to serve object at {}", identity.object_path))?;
        if !added {
            bail!(
                "{} is already served at {}",
                identity.interface_name,
                identity.object_path
            );
        }

        let iface_ref = connection
            .object_server()
            .interface::<_, DateTimeService>(identity.object_path)
            .await
            .context("Failed to look up the served interface")?;
        let forwarder = tokio::spawn(forward_changes(iface_ref, changes));

        log_system_event(
            "Object served",
            Some(&format!("{} at {}", identity.interface_name, identity.object_path)),
        );

        Ok(Self {
            connection,
            identity,
            forwarder,
        })
    }

    /// Requests the well-known name without queueing behind another owner.
    pub async fn claim_name(&self) -> Result<()> {
        let name = WellKnownName::try_from(self.identity.bus_name)
            .with_context(|| format!("Invalid bus name {}", self.identity.bus_name))?;
        let proxy = DBusProxy::new(&self.connection)
            .await
            .context("Failed to reach the bus daemon")?;

        let reply = proxy
            .request_name(name, RequestNameFlags::DoNotQueue.into())
            .await
            .with_context(|| format!("Failed to request bus name {}", self.identity.bus_name))?;

        match reply {
            RequestNameReply::PrimaryOwner | RequestNameReply::AlreadyOwner => {
                log_system_event("Bus name acquired", Some(self.identity.bus_name));
                Ok(())
            }
            other => bail!(
                "Bus name {} is already owned by another process ({:?})",
                self.identity.bus_name,
                other
            ),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn identity(&self) -> ServiceIdentity {
        self.identity
    }

    /// Hands control to the bus dispatch for good.
    ///
    /// There is no graceful shutdown: this only ends when the process is
    /// terminated.
    pub async fn run_forever(self) -> ! {
        log_system_event("Serving requests", Some(self.identity.bus_name));
        loop {
            std::future::pending::<()>().await;
        }
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Re-announces properties whose settings keys were changed by someone
/// other than the bus setter. zbus already signals setter writes.
async fn forward_changes(
    iface_ref: InterfaceRef<DateTimeService>,
    mut changes: broadcast::Receiver<SettingChange>,
) {
    loop {
        match changes.recv().await {
            Ok(change) if change.origin == ChangeOrigin::Property => {}
            Ok(change) => emit_changed(&iface_ref, Some(&change)).await,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Missed {} settings changes, re-announcing all properties", skipped);
                emit_changed(&iface_ref, None).await;
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn emit_changed(iface_ref: &InterfaceRef<DateTimeService>, change: Option<&SettingChange>) {
    let ctxt = iface_ref.signal_context();
    let service = iface_ref.get().await;

    if change.map_or(true, |c| service.auto_set_time_property().is_affected_by(c)) {
        debug!("Announcing AutoSetTime change");
        if let Err(e) = service.auto_set_time_changed(ctxt).await {
            warn!("Failed to emit AutoSetTime change: {}", e);
        }
    }

    if change.map_or(true, |c| service.time_show_format_property().is_affected_by(c)) {
        debug!("Announcing TimeShowFormat change");
        if let Err(e) = service.time_show_format_changed(ctxt).await {
            warn!("Failed to emit TimeShowFormat change: {}", e);
        }
    }
}
