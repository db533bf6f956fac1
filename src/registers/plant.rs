//! Plant-controller register plan. The plant is the singular aggregate
//! device on a connection (default station id 247).

use super::{
    AccessMode::{ReadOnly, ReadWrite, WriteOnly},
    PollTier::{Alarm, High, Low, Medium},
    RegisterDef,
    Unit::{Kilovar, Kilowatt, KilowattHour, Percent},
    WireType::{S32, U16, U32},
};

pub static TELEMETRY: &[(&str, RegisterDef)] = &[
    ("ems_work_mode", RegisterDef::new(30001, 1, ReadOnly, U16, 1.0, None, Medium)),
    ("grid_sensor_status", RegisterDef::new(30002, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("grid_sensor_active_power", RegisterDef::new(30003, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("grid_sensor_reactive_power", RegisterDef::new(30005, 2, ReadOnly, S32, 1000.0, Some(Kilovar), High)),
    ("on_off_grid_status", RegisterDef::new(30007, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("ess_soc", RegisterDef::new(30014, 1, ReadOnly, U16, 10.0, Some(Percent), Medium)),
    ("ess_soh", RegisterDef::new(30015, 1, ReadOnly, U16, 10.0, Some(Percent), Medium)),
    ("plant_active_power", RegisterDef::new(30016, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("plant_reactive_power", RegisterDef::new(30018, 2, ReadOnly, S32, 1000.0, Some(Kilovar), High)),
    ("photovoltaic_power", RegisterDef::new(30020, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("ess_power", RegisterDef::new(30022, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), High)),
    ("ess_available_max_charging_power", RegisterDef::new(30024, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), Medium)),
    ("ess_available_max_discharging_power", RegisterDef::new(30026, 2, ReadOnly, S32, 1000.0, Some(Kilowatt), Medium)),
    ("ess_available_max_charging_capacity", RegisterDef::new(30028, 2, ReadOnly, S32, 1000.0, Some(KilowattHour), Medium)),
    ("ess_available_max_discharging_capacity", RegisterDef::new(30030, 2, ReadOnly, S32, 1000.0, Some(KilowattHour), Medium)),
    ("ess_rated_energy_capacity", RegisterDef::new(30032, 2, ReadOnly, S32, 1000.0, Some(KilowattHour), Low)),
    ("ess_charge_cut_off_soc", RegisterDef::new(30034, 1, ReadOnly, U16, 1.0, Some(Percent), Low)),
    ("ess_discharge_cut_off_soc", RegisterDef::new(30035, 1, ReadOnly, U16, 1.0, Some(Percent), Low)),
    ("plant_running_state", RegisterDef::new(30051, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("plant_alarm_1", RegisterDef::new(30055, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("plant_alarm_2", RegisterDef::new(30056, 1, ReadOnly, U16, 1.0, None, Alarm)),
    ("plant_alarm_3", RegisterDef::new(30057, 1, ReadOnly, U16, 1.0, None, Alarm)),
];

pub static PARAMETERS: &[(&str, RegisterDef)] = &[
    ("plant_start_stop", RegisterDef::new(40000, 1, WriteOnly, U16, 1.0, None, Low)),
    ("plant_remote_ems_enable", RegisterDef::new(40029, 1, ReadWrite, U16, 1.0, None, Low)),
    ("plant_remote_ems_control_mode", RegisterDef::new(40031, 1, ReadWrite, U16, 1.0, None, Low)),
    ("plant_ess_max_charging_limit", RegisterDef::new(40032, 2, ReadWrite, U32, 1000.0, Some(Kilowatt), Low)),
    ("plant_ess_max_discharging_limit", RegisterDef::new(40034, 2, ReadWrite, U32, 1000.0, Some(Kilowatt), Low)),
    ("plant_pv_max_power_limit", RegisterDef::new(40036, 2, ReadWrite, U32, 1000.0, Some(Kilowatt), Low)),
    ("plant_grid_export_limit", RegisterDef::new(40038, 2, ReadWrite, U32, 1000.0, Some(Kilowatt), Low)),
];
