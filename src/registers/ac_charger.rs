//! AC charger register plan.

use super::{
    AccessMode::{ReadOnly, ReadWrite, WriteOnly},
    PollTier::{Alarm, High, Low},
    RegisterDef,
    Unit::{Ampere, Kilowatt, KilowattHour, Volt},
    WireType::{U16, U32, U64},
};

pub static TELEMETRY: &[(&str, RegisterDef)] = &[
    ("system_state", RegisterDef::new(30801, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("total_energy_consumed", RegisterDef::new(30802, 4, ReadOnly, U64, 10.0, Some(KilowattHour), Low)),
    ("charging_power", RegisterDef::new(30806, 2, ReadOnly, U32, 1000.0, Some(Kilowatt), High)),
    ("rated_power", RegisterDef::new(30808, 2, ReadOnly, U32, 1000.0, Some(Kilowatt), Low)),
    ("rated_current", RegisterDef::new(30810, 2, ReadOnly, U32, 1000.0, Some(Ampere), Low)),
    ("rated_voltage", RegisterDef::new(30812, 2, ReadOnly, U32, 10.0, Some(Volt), Low)),
    ("alarm_1", RegisterDef::new(30814, 1, ReadOnly, U16, 1.0, None, Alarm)),
];

pub static PARAMETERS: &[(&str, RegisterDef)] = &[
    ("ac_charger_start_stop", RegisterDef::new(42000, 1, WriteOnly, U16, 1.0, None, Low)),
    ("output_current_limit", RegisterDef::new(42001, 2, ReadWrite, U32, 100.0, Some(Ampere), Low)),
];
