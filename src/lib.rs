//! Modbus TCP acquisition and control for industrial energy storage
//! plants.
//!
//! One connection serves a fleet of logical sub-devices — a plant
//! controller, inverters, AC and DC chargers — each addressed by station
//! id. A single poller task refreshes registers at one of four frequency
//! tiers and folds partial results into a cumulative [`snapshot::Snapshot`];
//! parameter writes go through [`device::EssDevice::write_parameter`] and
//! force an immediate low-tier refresh so the written value reads back
//! promptly.

pub mod api;
pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod poller;
pub mod probe;
pub mod registers;
pub mod snapshot;
pub mod telemetry;
pub mod transport;

pub use codec::Value;
pub use device::EssDevice;
pub use error::DeviceError;
