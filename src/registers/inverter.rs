//! Hybrid-inverter register plan. Inverters carry the battery stack, so
//! the cell-level measurements live here rather than on the plant.

use super::{
    AccessMode::{ReadOnly, ReadWrite, WriteOnly},
    PollTier::{Alarm, High, Low, Medium},
    RegisterDef,
    Unit::{Ampere, Celsius, Hertz, Kilovar, Kilowatt, KilowattHour, Megaohm, Percent, Volt},
    WireType::{S16, S32, Str, U16, U32, U64},
};

pub static TELEMETRY: &[(&str, RegisterDef)] = &[
    ("model_type", RegisterDef::new(30501, 8, ReadOnly, Str, 1.0, None, Low)),
    ("serial_number", RegisterDef::new(30509, 8, ReadOnly, Str, 1.0, None, Low)),
    ("firmware_version", RegisterDef::new(30517, 4, ReadOnly, Str, 1.0, None, Low)),
    ("rated_active_power", RegisterDef::new(30521, 2, ReadOnly, U32, 1000.0, Some(Kilowatt), Low)),
    ("running_state", RegisterDef::new(30578, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("active_power", RegisterDef::new(30581, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("reactive_power", RegisterDef::new(30583, 2, ReadOnly, S32, 1000.0, Some(Kilovar), High)),
    ("ess_charge_discharge_power", RegisterDef::new(30585, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("ess_battery_soc", RegisterDef::new(30587, 1, ReadOnly, U16, 10.0, Some(Percent), Medium)),
    ("ess_battery_soh", RegisterDef::new(30588, 1, ReadOnly, U16, 10.0, Some(Percent), Medium)),
    ("ess_average_cell_temperature", RegisterDef::new(30589, 1, ReadOnly, S16, 10.0, Some(Celsius), Medium)),
    ("ess_average_cell_voltage", RegisterDef::new(30590, 1, ReadOnly, U16, 1000.0, Some(Volt), Medium)),
    ("ess_maximum_battery_temperature", RegisterDef::new(30591, 1, ReadOnly, S16, 10.0, Some(Celsius), Medium)),
    ("ess_minimum_battery_temperature", RegisterDef::new(30592, 1, ReadOnly, S16, 10.0, Some(Celsius), Medium)),
    ("ess_maximum_cell_voltage", RegisterDef::new(30593, 1, ReadOnly, U16, 1000.0, Some(Volt), Medium)),
    ("ess_minimum_cell_voltage", RegisterDef::new(30594, 1, ReadOnly, U16, 1000.0, Some(Volt), Medium)),
    ("grid_frequency", RegisterDef::new(30595, 1, ReadOnly, U16, 100.0, Some(Hertz), High)),
    ("pcs_internal_temperature", RegisterDef::new(30596, 1, ReadOnly, S16, 10.0, Some(Celsius), Medium)),
    ("output_type", RegisterDef::new(30597, 1, ReadOnly, U16, 1.0, None, Low)),
    ("phase_a_voltage", RegisterDef::new(30598, 1, ReadOnly, U16, 10.0, Some(Volt), High)),
    ("phase_b_voltage", RegisterDef::new(30599, 1, ReadOnly, U16, 10.0, Some(Volt), High)),
    ("phase_c_voltage", RegisterDef::new(30600, 1, ReadOnly, U16, 10.0, Some(Volt), High)),
    ("phase_a_current", RegisterDef::new(30601, 1, ReadOnly, U16, 100.0, Some(Ampere), High)),
    ("phase_b_current", RegisterDef::new(30602, 1, ReadOnly, U16, 100.0, Some(Ampere), High)),
    ("phase_c_current", RegisterDef::new(30603, 1, ReadOnly, U16, 100.0, Some(Ampere), High)),
    ("power_factor", RegisterDef::new(30604, 1, ReadOnly, S16, 1000.0, None, High)),
    ("pv_power", RegisterDef::new(30605, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("insulation_resistance", RegisterDef::new(30607, 1, ReadOnly, U16, 10.0, Some(Megaohm), Medium)),
    ("alarm_1", RegisterDef::new(30608, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("alarm_2", RegisterDef::new(30609, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("alarm_3", RegisterDef::new(30610, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("ess_daily_charge_energy", RegisterDef::new(30631, 2, ReadOnly, U32, 10.0, Some(KilowattHour), Medium)),
    ("ess_accumulated_charge_energy", RegisterDef::new(30633, 4, ReadOnly, U64, 10.0, Some(KilowattHour), Low)),
    ("ess_daily_discharge_energy", RegisterDef::new(30637, 2, ReadOnly, U32, 10.0, Some(KilowattHour), Medium)),
    ("ess_accumulated_discharge_energy", RegisterDef::new(30639, 4, ReadOnly, U64, 10.0, Some(KilowattHour), Low)),
];

pub static PARAMETERS: &[(&str, RegisterDef)] = &[
    ("inverter_start_stop", RegisterDef::new(40500, 1, WriteOnly, U16, 1.0, None, Low)),
    ("grid_charge_cut_off_soc", RegisterDef::new(40501, 1, ReadWrite, U16, 10.0, Some(Percent), Low)),
    ("grid_discharge_cut_off_soc", RegisterDef::new(40502, 1, ReadWrite, U16, 10.0, Some(Percent), Low)),
    ("active_power_limit", RegisterDef::new(40503, 2, ReadWrite, U32, 1000.0, Some(Kilowatt), Low)),
    ("reactive_power_limit", RegisterDef::new(40505, 2, ReadWrite, U32, 1000.0, Some(Kilovar), Low)),
];
