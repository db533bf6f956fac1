//! Connection-scoped context object.
//!
//! Everything that lives for the duration of one plant connection —
//! transport, support flags, snapshot and the poller's wake channel — hangs
//! off [`EssDevice`]. It is constructed at connection setup and handed to
//! every consumer explicitly; there is no global hub.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::codec::{self, Value};
use crate::config::{Config, ConnectionConfig};
use crate::error::DeviceError;
use crate::poller::{Poller, RefreshNow};
use crate::probe::SupportMap;
use crate::registers::{self, DeviceClass};
use crate::snapshot::Snapshot;
use crate::transport::{ConnectionState, ModbusTransport, RegisterIo};

#[derive(Clone)]
pub struct EssDevice {
    connection: ConnectionConfig,
    io: Arc<dyn RegisterIo>,
    transport: Option<Arc<ModbusTransport>>,
    support: Arc<SupportMap>,
    snapshot: Arc<RwLock<Snapshot>>,
    refresh_tx: mpsc::Sender<RefreshNow>,
    shutdown: CancellationToken,
}

impl EssDevice {
    /// Build the device context and its poller. The caller owns spawning
    /// the poller task (`tokio::spawn(poller.run())`).
    pub fn new(cfg: &Config) -> anyhow::Result<(Self, Poller)> {
        let endpoint = cfg.connection.socket_addr()?;
        let transport = Arc::new(ModbusTransport::new(endpoint, cfg.polling.operation_timeout()));
        let io: Arc<dyn RegisterIo> = transport.clone();
        Ok(Self::assemble(cfg, io, Some(transport)))
    }

    #[cfg(test)]
    pub(crate) fn for_tests(cfg: &Config, io: Arc<dyn RegisterIo>) -> (Self, Poller) {
        Self::assemble(cfg, io, None)
    }

    fn assemble(
        cfg: &Config,
        io: Arc<dyn RegisterIo>,
        transport: Option<Arc<ModbusTransport>>,
    ) -> (Self, Poller) {
        let support = Arc::new(SupportMap::new());
        let snapshot = Arc::new(RwLock::new(Snapshot::default()));
        let (refresh_tx, refresh_rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        let poller = Poller::new(
            io.clone(),
            support.clone(),
            snapshot.clone(),
            &cfg.connection,
            &cfg.polling,
            refresh_rx,
            shutdown.clone(),
        );

        let device = Self {
            connection: cfg.connection.clone(),
            io,
            transport,
            support,
            snapshot,
            refresh_tx,
            shutdown,
        };
        (device, poller)
    }

    /// Clone of the current snapshot. Never blocks on I/O — the read lock
    /// is held only for the copy, and a failed cycle leaves the last
    /// merged state in place.
    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport
            .as_ref()
            .map(|t| t.connection_state())
            .unwrap_or(ConnectionState::Disconnected)
    }

    /// Write one parameter to a station.
    ///
    /// Fails before any wire I/O on read-only mode, an unconfigured
    /// station, an unknown field or a non-writable register. On success
    /// the poller is poked so the written value and its dependent
    /// read-back fields surface on an immediate Low-tier cycle.
    pub async fn write_parameter(
        &self,
        class: DeviceClass,
        station: u8,
        field: &str,
        value: Value,
    ) -> Result<(), DeviceError> {
        if self.connection.read_only {
            return Err(DeviceError::ReadOnlyMode);
        }
        if !self.connection.has_station(class, station) {
            return Err(DeviceError::UnknownStation { class, station });
        }
        let def = match registers::parameter(class, field) {
            Some(def) => def,
            None => {
                // a telemetry field is a real name, just not a writable one
                if let Some((_, def)) =
                    registers::telemetry(class).iter().find(|(name, _)| *name == field)
                {
                    return Err(DeviceError::NotWritable { address: def.address });
                }
                return Err(DeviceError::UnknownParameter {
                    class,
                    name: field.to_owned(),
                });
            }
        };

        let words = codec::encode(&value, def)?;
        self.io
            .write_registers(station, def.address, words, def.access)
            .await?;
        info!(%class, station, field, "parameter written");

        // best-effort: a full queue means a refresh is already pending
        let _ = self.refresh_tx.try_send(RefreshNow);
        Ok(())
    }

    /// Re-arm support probing for one station. The next cycle that touches
    /// it runs a fresh probe pass.
    pub fn reprobe(&self, class: DeviceClass, station: u8) -> Result<(), DeviceError> {
        if !self.connection.has_station(class, station) {
            return Err(DeviceError::UnknownStation { class, station });
        }
        self.support.reset(station);
        info!(%class, station, "support probing re-armed");
        Ok(())
    }

    /// Stop the poller and drop the connection.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if let Some(transport) = &self.transport {
            transport.disconnect().await;
        }
    }
}
