//! Static register catalogs for the supported device classes.
//!
//! Everything in here is pure data: addresses, word counts, access modes,
//! wire types and gains are fixed at compile time and never touch the wire.
//! The poller and the write entry point both resolve fields through these
//! tables; per-unit support state lives elsewhere (`crate::probe`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub mod ac_charger;
pub mod dc_charger;
pub mod inverter;
pub mod plant;

/// Logical sub-device kinds reachable behind one Modbus TCP endpoint.
///
/// The plant controller is singular per connection; the other classes are
/// enumerable collections keyed by station id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Plant,
    Inverter,
    AcCharger,
    DcCharger,
}

/// How a register block may be accessed on the wire.
///
/// Read-only registers live in the input-register space (function 0x04),
/// read-write registers in the holding space (0x03 / 0x06 / 0x10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
    WriteOnly,
}

impl AccessMode {
    pub fn is_readable(self) -> bool {
        !matches!(self, AccessMode::WriteOnly)
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }
}

/// On-wire representation of a register value. Multi-word values are
/// big-endian with the most significant word at the lowest address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum WireType {
    U16,
    S16,
    U32,
    S32,
    U64,
    /// Fixed-length ASCII, NUL-padded to the catalog word count.
    Str,
}

impl WireType {
    /// Words a value of this type occupies; `None` for strings, whose
    /// length comes from the catalog entry instead.
    pub fn word_count(self) -> Option<u16> {
        match self {
            WireType::U16 | WireType::S16 => Some(1),
            WireType::U32 | WireType::S32 => Some(2),
            WireType::U64 => Some(4),
            WireType::Str => None,
        }
    }
}

/// Polling frequency tier. High-tier registers refresh on every cycle; the
/// remaining tiers piggyback at their configured cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum PollTier {
    High,
    Alarm,
    Medium,
    Low,
}

/// Engineering unit of a register, used only to bound plausible readings
/// during support probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Unit {
    #[strum(serialize = "V")]
    Volt,
    #[strum(serialize = "A")]
    Ampere,
    #[strum(serialize = "kW")]
    Kilowatt,
    #[strum(serialize = "kvar")]
    Kilovar,
    #[strum(serialize = "kWh")]
    KilowattHour,
    #[strum(serialize = "°C")]
    Celsius,
    #[strum(serialize = "%")]
    Percent,
    #[strum(serialize = "Hz")]
    Hertz,
    #[strum(serialize = "MΩ")]
    Megaohm,
}

impl Unit {
    /// Plausibility window used by the probe. A reading outside the window
    /// is treated as garbage from an unimplemented register rather than a
    /// real measurement. Units without a meaningful bound accept anything.
    pub fn plausible(self, value: f64) -> bool {
        match self {
            Unit::Volt | Unit::Ampere => value.abs() <= 1000.0,
            Unit::Kilowatt => value.abs() <= 100.0,
            Unit::KilowattHour => value.abs() <= 100_000.0,
            Unit::Celsius => (-50.0..=100.0).contains(&value),
            Unit::Percent => (0.0..=120.0).contains(&value),
            Unit::Hertz | Unit::Kilovar | Unit::Megaohm => true,
        }
    }
}

/// Immutable description of one register block. Identity is the pair of
/// device class and field name in the owning catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegisterDef {
    pub address: u16,
    /// Contiguous 16-bit registers the value spans.
    pub count: u16,
    pub access: AccessMode,
    pub wire: WireType,
    /// Raw-to-engineering divisor: decoded = raw / gain, encoded raw =
    /// round(value × gain). Never zero.
    pub gain: f64,
    pub unit: Option<Unit>,
    pub tier: PollTier,
}

impl RegisterDef {
    pub const fn new(
        address: u16,
        count: u16,
        access: AccessMode,
        wire: WireType,
        gain: f64,
        unit: Option<Unit>,
        tier: PollTier,
    ) -> Self {
        Self { address, count, access, wire, gain, unit, tier }
    }
}

/// A named catalog entry.
pub type CatalogEntry = (&'static str, RegisterDef);

/// Telemetry registers (the read path) for a device class.
pub fn telemetry(class: DeviceClass) -> &'static [CatalogEntry] {
    match class {
        DeviceClass::Plant => plant::TELEMETRY,
        DeviceClass::Inverter => inverter::TELEMETRY,
        DeviceClass::AcCharger => ac_charger::TELEMETRY,
        DeviceClass::DcCharger => dc_charger::TELEMETRY,
    }
}

/// Writable parameters for a device class.
pub fn parameters(class: DeviceClass) -> &'static [CatalogEntry] {
    match class {
        DeviceClass::Plant => plant::PARAMETERS,
        DeviceClass::Inverter => inverter::PARAMETERS,
        DeviceClass::AcCharger => ac_charger::PARAMETERS,
        DeviceClass::DcCharger => dc_charger::PARAMETERS,
    }
}

/// Every register the poller refreshes for a class: telemetry plus the
/// parameters that can be read back.
pub fn readable(class: DeviceClass) -> impl Iterator<Item = &'static CatalogEntry> {
    telemetry(class)
        .iter()
        .chain(parameters(class).iter().filter(|(_, def)| def.access.is_readable()))
}

/// Look up a writable parameter by field name.
pub fn parameter(class: DeviceClass, name: &str) -> Option<&'static RegisterDef> {
    static INDEX: Lazy<HashMap<DeviceClass, HashMap<&'static str, &'static RegisterDef>>> =
        Lazy::new(|| {
            use strum::IntoEnumIterator;
            DeviceClass::iter()
                .map(|class| {
                    let by_name = parameters(class)
                        .iter()
                        .map(|(name, def)| (*name, def))
                        .collect();
                    (class, by_name)
                })
                .collect()
        });
    INDEX.get(&class).and_then(|by_name| by_name.get(name)).copied()
}
