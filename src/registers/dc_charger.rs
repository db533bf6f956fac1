//! DC charger register plan. DC chargers hang off an inverter but answer
//! on their own station id.

use super::{
    AccessMode::{ReadOnly, ReadWrite, WriteOnly},
    PollTier::{Alarm, High, Low, Medium},
    RegisterDef,
    Unit::{Ampere, Kilowatt, KilowattHour, Volt},
    WireType::{S32, U16, U32, U64},
};

pub static TELEMETRY: &[(&str, RegisterDef)] = &[
    ("running_state", RegisterDef::new(31000, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("output_power", RegisterDef::new(31001, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("output_voltage", RegisterDef::new(31003, 1, ReadOnly, U16, 10.0, Some(Volt), High)),
    ("output_current", RegisterDef::new(31004, 1, ReadOnly, U16, 100.0, Some(Ampere), High)),
    ("daily_energy_output", RegisterDef::new(31005, 2, ReadOnly, U32, 10.0, Some(KilowattHour), Medium)),
    ("accumulated_energy_output", RegisterDef::new(31007, 4, ReadOnly, U64, 10.0, Some(KilowattHour), Low)),
    ("alarm_1", RegisterDef::new(31011, 1, ReadOnly, U16, 1.0, None, Alarm)),
];

pub static PARAMETERS: &[(&str, RegisterDef)] = &[
    ("dc_charger_start_stop", RegisterDef::new(41000, 1, WriteOnly, U16, 1.0, None, Low)),
    ("output_power_limit", RegisterDef::new(41001, 2, ReadWrite, U32, 1000.0, Some(Kilowatt), Low)),
];
