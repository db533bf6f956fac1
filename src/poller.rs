//! Tiered polling loop.
//!
//! One task owns the tick loop and the snapshot; nothing else writes
//! either. Every tick resolves to a tier, reads the high-tier registers
//! plus the selected tier's registers for every station, and folds the
//! results into the snapshot. Writes poke the loop through a channel so a
//! just-written parameter is read back on an immediate Low-tier cycle
//! instead of waiting for the natural cadence.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec::{self, Value};
use crate::config::{ConnectionConfig, PollingConfig};
use crate::error::DeviceError;
use crate::probe::{probe_station, SupportMap, SupportState};
use crate::registers::{self, DeviceClass, PollTier, RegisterDef};
use crate::snapshot::Snapshot;
use crate::transport::RegisterIo;

/// Out-of-band poke from the write path: forces the next cycle onto the
/// Low tier and runs it immediately.
#[derive(Debug, Clone, Copy)]
pub struct RefreshNow;

/// Integer cycle ratios between the high-tier interval and the slower
/// tiers, each the ceiling of interval ÷ high-interval, floored at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCadence {
    pub alarm: u32,
    pub medium: u32,
    pub low: u32,
}

impl TierCadence {
    pub fn from_config(polling: &PollingConfig) -> Self {
        let high = polling.high_interval_seconds.max(1);
        let ratio = |interval: u64| interval.div_ceil(high).max(1) as u32;
        Self {
            alarm: ratio(polling.alarm_interval_seconds),
            medium: ratio(polling.medium_interval_seconds),
            low: ratio(polling.low_interval_seconds),
        }
    }
}

/// Monotonic cycle counter with tier selection.
#[derive(Debug)]
pub struct TierCounter {
    counter: u32,
    cadence: TierCadence,
}

impl TierCounter {
    pub fn new(cadence: TierCadence) -> Self {
        Self { counter: 0, cadence }
    }

    /// Advance one cycle and select its tier, strict priority
    /// Low > Medium > Alarm > High. Selecting Low resets the counter.
    pub fn advance(&mut self) -> PollTier {
        self.counter += 1;
        if self.counter % self.cadence.low == 0 {
            self.counter = 0;
            PollTier::Low
        } else if self.counter % self.cadence.medium == 0 {
            PollTier::Medium
        } else if self.counter % self.cadence.alarm == 0 {
            PollTier::Alarm
        } else {
            PollTier::High
        }
    }

    /// Arrange for the very next tick to resolve to the Low tier.
    pub fn force_low_next(&mut self) {
        self.counter = self.cadence.low - 1;
    }
}

pub struct Poller {
    io: Arc<dyn RegisterIo>,
    support: Arc<SupportMap>,
    snapshot: Arc<RwLock<Snapshot>>,
    stations: Vec<(DeviceClass, u8)>,
    counter: TierCounter,
    high_interval: Duration,
    cycle_timeout: Duration,
    refresh_rx: mpsc::Receiver<RefreshNow>,
    shutdown: CancellationToken,
}

impl Poller {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        io: Arc<dyn RegisterIo>,
        support: Arc<SupportMap>,
        snapshot: Arc<RwLock<Snapshot>>,
        connection: &ConnectionConfig,
        polling: &PollingConfig,
        refresh_rx: mpsc::Receiver<RefreshNow>,
        shutdown: CancellationToken,
    ) -> Self {
        let cadence = TierCadence::from_config(polling);
        info!(?cadence, interval = ?polling.high_interval(), "polling cadence derived");
        Self {
            io,
            support,
            snapshot,
            stations: connection.stations(),
            counter: TierCounter::new(cadence),
            high_interval: polling.high_interval(),
            cycle_timeout: polling.cycle_timeout(),
            refresh_rx,
            shutdown,
        }
    }

    /// Drive the tick loop until shutdown. Ticks never overlap: a new
    /// cycle starts only after the previous one finished or timed out.
    pub async fn run(mut self) {
        let mut ticker = interval(self.high_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("poller stopping");
                    return;
                }
                _ = ticker.tick() => {}
                poke = self.refresh_rx.recv() => {
                    if poke.is_none() {
                        return;
                    }
                    self.counter.force_low_next();
                    debug!("refresh requested, next cycle forced to low tier");
                }
            }
            self.run_cycle().await;
        }
    }

    async fn run_cycle(&mut self) {
        let tier = self.counter.advance();
        let started = Instant::now();
        let timed_out = timeout(self.cycle_timeout, self.poll_fleet(tier)).await.is_err();
        let elapsed = started.elapsed();

        let overrun = elapsed > self.high_interval;
        if timed_out {
            // merges applied before the deadline stay in the snapshot
            warn!(%tier, ?elapsed, "cycle abandoned at timeout, partial results kept");
        } else if overrun {
            warn!(%tier, ?elapsed, budget = ?self.high_interval, "cycle overran the high-tier interval");
        } else {
            debug!(%tier, ?elapsed, "cycle complete");
        }

        let mut snapshot = self.snapshot.write().await;
        let stats = &mut snapshot.cycles;
        stats.completed += 1;
        stats.last_tier = Some(tier);
        stats.last_duration_ms = Some(elapsed.as_millis() as u64);
        stats.last_finished_at = Some(chrono::Utc::now());
        if timed_out {
            stats.timeouts += 1;
        }
        if overrun {
            stats.overruns += 1;
        }
    }

    async fn poll_fleet(&self, tier: PollTier) {
        for (class, station) in &self.stations {
            self.poll_station(*class, *station, tier).await;
        }
    }

    /// Read one station's registers for this cycle and merge the result.
    ///
    /// Per-register failures are isolated; a link failure abandons the
    /// rest of the station's pass since the connection is gone anyway.
    async fn poll_station(&self, class: DeviceClass, station: u8, tier: PollTier) {
        let mut updates: Vec<(&'static str, Option<Value>)> = Vec::new();

        if !self.support.is_probed(station) {
            if let Err(err) =
                probe_station(self.io.as_ref(), &self.support, station, registers::readable(class))
                    .await
            {
                warn!(%class, station, error = %err, "support probe aborted");
                return;
            }
            // fields the probe ruled out enter the snapshot as explicit
            // not-known markers, exactly once
            updates.extend(
                registers::readable(class)
                    .filter(|&&(name, _)| {
                        self.support.state(station, name) == SupportState::Unsupported
                    })
                    .map(|&(name, _)| (name, None)),
            );
        }

        for &(name, def) in registers::readable(class) {
            if def.tier != PollTier::High && def.tier != tier {
                continue;
            }
            let known = self.support.state(station, name);
            if known == SupportState::Unsupported {
                continue;
            }
            match self.read_field(station, &def).await {
                Ok(value) => {
                    if known != SupportState::Supported {
                        self.support.set(station, name, SupportState::Supported);
                    }
                    updates.push((name, Some(value)));
                }
                Err(err) if err.is_link() => {
                    warn!(%class, station, error = %err, "station pass abandoned");
                    break;
                }
                Err(err) => {
                    if known == SupportState::Unknown {
                        // first-ever read failed: record the field as not
                        // known and stop trying
                        debug!(%class, station, field = name, error = %err, "first read failed");
                        self.support.set(station, name, SupportState::Unsupported);
                        updates.push((name, None));
                    } else {
                        debug!(%class, station, field = name, error = %err,
                            "transient read failure, keeping last value");
                    }
                }
            }
        }

        let mut snapshot = self.snapshot.write().await;
        snapshot.merge_station(class, station, updates);
    }

    async fn read_field(&self, station: u8, def: &RegisterDef) -> Result<Value, DeviceError> {
        let words = self
            .io
            .read_registers(station, def.address, def.count, def.access)
            .await?;
        codec::decode(&words, def)
    }
}
