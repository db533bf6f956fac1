use std::time::Duration;

use thiserror::Error;

use crate::registers::{DeviceClass, WireType};

/// Failure taxonomy for register access.
///
/// `Link`, `Protocol` and `Timeout` classify transport outcomes; the rest
/// are rejected before any I/O happens. Link failures drop the connection
/// so the next operation redials; protocol failures (a well-formed Modbus
/// exception) leave the link up.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("connection error: {0}")]
    Link(String),

    #[error("device rejected request: {0}")]
    Protocol(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("register {address} is not readable")]
    NotReadable { address: u16 },

    #[error("register {address} is not writable")]
    NotWritable { address: u16 },

    #[error("{wire} register cannot hold a {kind} value")]
    UnsupportedType { wire: WireType, kind: &'static str },

    #[error("scaled value {scaled} does not fit in a {wire} register")]
    EncodingOverflow { scaled: i128, wire: WireType },

    #[error("string of {len} bytes exceeds {capacity}-byte register block")]
    StringOverflow { len: usize, capacity: usize },

    #[error("short response: expected {expected} words, got {got}")]
    ShortResponse { expected: usize, got: usize },

    #[error("unknown {class} parameter: {name}")]
    UnknownParameter { class: DeviceClass, name: String },

    #[error("no configured {class} with station id {station}")]
    UnknownStation { class: DeviceClass, station: u8 },

    #[error("writes are disabled in read-only mode")]
    ReadOnlyMode,
}

impl DeviceError {
    /// Whether the connection itself is gone. Only these failures make the
    /// transport redial; everything else leaves the link alone.
    pub fn is_link(&self) -> bool {
        matches!(self, DeviceError::Link(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_classification() {
        assert!(DeviceError::Link("refused".into()).is_link());
        assert!(!DeviceError::Protocol("illegal data address".into()).is_link());
        assert!(!DeviceError::Timeout(Duration::from_secs(2)).is_link());
    }

    #[test]
    fn display_names_the_register() {
        let err = DeviceError::NotWritable { address: 30051 };
        assert!(err.to_string().contains("30051"));
    }
}
