//! Cumulative, partially-updated view of every known register value.
//!
//! The snapshot is owned by the poller task and mutated only during merge
//! steps; consumers take a full clone through the device handle and never
//! observe a half-applied cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::codec::Value;
use crate::registers::{DeviceClass, PollTier};

/// One station's field values.
///
/// `None` is the explicit "not currently known" marker. Once a field has
/// been read successfully it stays present with its last good value even
/// on cycles that do not refresh its tier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StationSnapshot {
    pub fields: BTreeMap<&'static str, Option<Value>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StationSnapshot {
    /// Current value of a field, `None` when absent or not known.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).and_then(|v| v.as_ref())
    }
}

/// Bookkeeping for the polling loop, exposed through the health endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleStats {
    pub completed: u64,
    pub last_tier: Option<PollTier>,
    pub last_duration_ms: Option<u64>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub overruns: u64,
    pub timeouts: u64,
}

/// Snapshot over the whole fleet behind one connection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub plant: StationSnapshot,
    pub inverters: BTreeMap<u8, StationSnapshot>,
    pub ac_chargers: BTreeMap<u8, StationSnapshot>,
    pub dc_chargers: BTreeMap<u8, StationSnapshot>,
    pub cycles: CycleStats,
}

impl Snapshot {
    pub fn station(&self, class: DeviceClass, station: u8) -> Option<&StationSnapshot> {
        match class {
            DeviceClass::Plant => Some(&self.plant),
            DeviceClass::Inverter => self.inverters.get(&station),
            DeviceClass::AcCharger => self.ac_chargers.get(&station),
            DeviceClass::DcCharger => self.dc_chargers.get(&station),
        }
    }

    fn station_mut(&mut self, class: DeviceClass, station: u8) -> &mut StationSnapshot {
        match class {
            DeviceClass::Plant => &mut self.plant,
            DeviceClass::Inverter => self.inverters.entry(station).or_default(),
            DeviceClass::AcCharger => self.ac_chargers.entry(station).or_default(),
            DeviceClass::DcCharger => self.dc_chargers.entry(station).or_default(),
        }
    }

    /// Fold one station's partial cycle result into the snapshot.
    ///
    /// Fields present in `updates` are overwritten (including explicit
    /// `None` for a first-read failure); everything else is untouched, so
    /// values from earlier cycles survive tiers that do not refresh them.
    pub fn merge_station(
        &mut self,
        class: DeviceClass,
        station: u8,
        updates: Vec<(&'static str, Option<Value>)>,
    ) {
        if updates.is_empty() {
            return;
        }
        let snap = self.station_mut(class, station);
        snap.updated_at = Some(Utc::now());
        for (name, value) in updates {
            snap.fields.insert(name, value);
        }
    }
}
