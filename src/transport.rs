//! Modbus TCP transport.
//!
//! One physical connection serves every station behind the endpoint, and the
//! protocol cannot multiplex, so every read and write — scheduled poll or
//! externally triggered parameter write — serializes through the same mutex.
//! Link-level failures drop the connection; the next operation redials.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use strum::Display;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_modbus::client::{tcp, Context};
use tokio_modbus::prelude::*;
use tracing::{debug, info, warn};

use crate::error::DeviceError;
use crate::registers::AccessMode;

/// Register-level I/O seam. The poller, the probe and the write entry point
/// all go through this trait so they can be exercised without a socket.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegisterIo: Send + Sync {
    /// Read `count` contiguous registers from a station. The access mode
    /// selects the function family: input registers for `ReadOnly`,
    /// holding registers for `ReadWrite`.
    async fn read_registers(
        &self,
        station: u8,
        address: u16,
        count: u16,
        access: AccessMode,
    ) -> Result<Vec<u16>, DeviceError>;

    /// Write registers to a station: the single-register function for one
    /// word, the multi-register function otherwise.
    async fn write_registers(
        &self,
        station: u8,
        address: u16,
        words: Vec<u16>,
        access: AccessMode,
    ) -> Result<(), DeviceError>;
}

/// Observable connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct ModbusTransport {
    endpoint: SocketAddr,
    op_timeout: Duration,
    link: Mutex<Option<Context>>,
    state: parking_lot::Mutex<ConnectionState>,
}

impl ModbusTransport {
    pub fn new(endpoint: SocketAddr, op_timeout: Duration) -> Self {
        Self {
            endpoint,
            op_timeout,
            link: Mutex::new(None),
            state: parking_lot::Mutex::new(ConnectionState::Disconnected),
        }
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Drop the current connection, if any. The next operation redials.
    pub async fn disconnect(&self) {
        let mut link = self.link.lock().await;
        if link.take().is_some() {
            info!(endpoint = %self.endpoint, "disconnected");
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }

    /// Dial the endpoint if the link is down. Must be called with the link
    /// mutex held.
    async fn ensure_connected<'a>(
        &self,
        link: &'a mut Option<Context>,
    ) -> Result<&'a mut Context, DeviceError> {
        match link {
            Some(ctx) => Ok(ctx),
            None => {
                self.set_state(ConnectionState::Connecting);
                debug!(endpoint = %self.endpoint, "dialing");
                let ctx = match timeout(self.op_timeout, tcp::connect(self.endpoint)).await {
                    Err(_) => {
                        self.set_state(ConnectionState::Disconnected);
                        return Err(DeviceError::Timeout(self.op_timeout));
                    }
                    Ok(Err(err)) => {
                        self.set_state(ConnectionState::Disconnected);
                        return Err(DeviceError::Link(err.to_string()));
                    }
                    Ok(Ok(ctx)) => ctx,
                };
                info!(endpoint = %self.endpoint, "connected");
                self.set_state(ConnectionState::Connected);
                Ok(link.insert(ctx))
            }
        }
    }

    /// Classify an I/O failure. Socket-level errors take the link down so
    /// the next call reconnects; anything else is a Modbus exception from
    /// a live device and leaves the connection alone.
    fn classify(&self, link: &mut Option<Context>, err: std::io::Error) -> DeviceError {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof
            | ErrorKind::TimedOut => {
                *link = None;
                self.set_state(ConnectionState::Disconnected);
                warn!(endpoint = %self.endpoint, error = %err, "link lost");
                DeviceError::Link(err.to_string())
            }
            _ => DeviceError::Protocol(err.to_string()),
        }
    }

    /// A timed-out request may still get a late reply that would desync the
    /// stream, so the connection is dropped along with the classification.
    fn on_timeout(&self, link: &mut Option<Context>) -> DeviceError {
        *link = None;
        self.set_state(ConnectionState::Disconnected);
        warn!(endpoint = %self.endpoint, timeout = ?self.op_timeout, "operation timed out");
        DeviceError::Timeout(self.op_timeout)
    }
}

#[async_trait]
impl RegisterIo for ModbusTransport {
    async fn read_registers(
        &self,
        station: u8,
        address: u16,
        count: u16,
        access: AccessMode,
    ) -> Result<Vec<u16>, DeviceError> {
        if !access.is_readable() {
            return Err(DeviceError::NotReadable { address });
        }

        let mut link = self.link.lock().await;
        let ctx = self.ensure_connected(&mut link).await?;
        ctx.set_slave(Slave(station));

        let request = async {
            match access {
                AccessMode::ReadOnly => ctx.read_input_registers(address, count).await,
                _ => ctx.read_holding_registers(address, count).await,
            }
        };
        match timeout(self.op_timeout, request).await {
            Err(_) => Err(self.on_timeout(&mut link)),
            Ok(Err(err)) => Err(self.classify(&mut link, err)),
            Ok(Ok(words)) => Ok(words),
        }
    }

    async fn write_registers(
        &self,
        station: u8,
        address: u16,
        words: Vec<u16>,
        access: AccessMode,
    ) -> Result<(), DeviceError> {
        if !access.is_writable() {
            return Err(DeviceError::NotWritable { address });
        }

        let mut link = self.link.lock().await;
        let ctx = self.ensure_connected(&mut link).await?;
        ctx.set_slave(Slave(station));

        let request = async {
            match words.as_slice() {
                [word] => ctx.write_single_register(address, *word).await,
                many => ctx.write_multiple_registers(address, many).await,
            }
        };
        match timeout(self.op_timeout, request).await {
            Err(_) => Err(self.on_timeout(&mut link)),
            Ok(Err(err)) => Err(self.classify(&mut link, err)),
            Ok(Ok(())) => {
                debug!(station, address, words = words.len(), "registers written");
                Ok(())
            }
        }
    }
}
