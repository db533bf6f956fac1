//! Per-register support probing.
//!
//! Physical units implement overlapping subsets of the register plan, and
//! the protocol has no discovery mechanism, so the first time a station is
//! polled every readable register gets one classification read. The
//! classification is a heuristic: an exception response, an empty payload,
//! an all-zero string or an implausible reading all mean "this unit does
//! not implement the register", and the poller skips it from then on.
//! False negatives are accepted as the cost of not hammering dead
//! registers on every cycle; an explicit reset re-arms the probe.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::debug;

use crate::codec;
use crate::error::DeviceError;
use crate::registers::{CatalogEntry, RegisterDef, WireType};
use crate::transport::RegisterIo;

/// Tri-state support classification for one (station, field) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupportState {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

/// Support flags for every (station, field) pair, shared between the probe
/// and the poller. Never inferred from snapshot values.
#[derive(Default)]
pub struct SupportMap {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    fields: HashMap<(u8, &'static str), SupportState>,
    probed: HashSet<u8>,
}

impl SupportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, station: u8, field: &'static str) -> SupportState {
        self.inner
            .read()
            .fields
            .get(&(station, field))
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&self, station: u8, field: &'static str, state: SupportState) {
        self.inner.write().fields.insert((station, field), state);
    }

    /// Whether the station completed a full probe pass.
    pub fn is_probed(&self, station: u8) -> bool {
        self.inner.read().probed.contains(&station)
    }

    pub fn mark_probed(&self, station: u8) {
        self.inner.write().probed.insert(station);
    }

    /// Forget everything about a station so the next poll re-probes it.
    pub fn reset(&self, station: u8) {
        let mut inner = self.inner.write();
        inner.fields.retain(|(s, _), _| *s != station);
        inner.probed.remove(&station);
    }
}

/// Probe every readable register of a catalog once and record support.
///
/// Returns `Err` only on link loss, which aborts the pass: remaining
/// registers stay `Unknown` and the probe re-runs on the next cycle. Link
/// failures never classify a register as unsupported.
pub async fn probe_station(
    io: &dyn RegisterIo,
    support: &SupportMap,
    station: u8,
    registers: impl Iterator<Item = &'static CatalogEntry>,
) -> Result<(), DeviceError> {
    for &(name, def) in registers {
        if !def.access.is_readable() {
            continue;
        }
        match io
            .read_registers(station, def.address, def.count, def.access)
            .await
        {
            Ok(words) => {
                let state = classify_reading(&words, &def);
                if state == SupportState::Unsupported {
                    debug!(station, field = name, "register classified unsupported");
                }
                support.set(station, name, state);
            }
            Err(err) if err.is_link() => return Err(err),
            Err(err) => {
                debug!(station, field = name, error = %err, "register classified unsupported");
                support.set(station, name, SupportState::Unsupported);
            }
        }
    }
    support.mark_probed(station);
    Ok(())
}

/// Classify a successful read.
///
/// Zero-filled string blocks indicate an unimplemented feature, but a
/// partially filled string is fine. Numeric readings are checked against
/// the plausibility window of their unit, when they have one.
pub fn classify_reading(words: &[u16], def: &RegisterDef) -> SupportState {
    if words.is_empty() {
        return SupportState::Unsupported;
    }
    if def.wire == WireType::Str {
        return if words.iter().all(|w| *w == 0) {
            SupportState::Unsupported
        } else {
            SupportState::Supported
        };
    }
    match codec::decode(words, def) {
        Ok(value) => match (def.unit, value.as_f64()) {
            (Some(unit), Some(v)) if !unit.plausible(v) => SupportState::Unsupported,
            _ => SupportState::Supported,
        },
        Err(_) => SupportState::Unsupported,
    }
}
