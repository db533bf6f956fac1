use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use tracing::warn;
use validator::Validate;

use crate::registers::DeviceClass;

/// Documented fallback when the configured high-tier interval is zero.
pub const DEFAULT_HIGH_INTERVAL_SECONDS: u64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub connection: ConnectionConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// The Modbus TCP endpoint and the fleet of stations behind it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConnectionConfig {
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// Plant controller station id. 247 is the conventional plant address.
    #[serde(default = "default_plant_station")]
    pub plant_station: u8,
    #[serde(default)]
    pub inverter_stations: Vec<u8>,
    #[serde(default)]
    pub ac_charger_stations: Vec<u8>,
    #[serde(default)]
    pub dc_charger_stations: Vec<u8>,
    /// Reject every parameter write when set. On by default: mutating a
    /// running plant is opt-in.
    #[serde(default = "default_read_only")]
    pub read_only: bool,
}

impl ConnectionConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Every configured station, plant first.
    pub fn stations(&self) -> Vec<(DeviceClass, u8)> {
        let mut all = vec![(DeviceClass::Plant, self.plant_station)];
        all.extend(self.inverter_stations.iter().map(|s| (DeviceClass::Inverter, *s)));
        all.extend(self.ac_charger_stations.iter().map(|s| (DeviceClass::AcCharger, *s)));
        all.extend(self.dc_charger_stations.iter().map(|s| (DeviceClass::DcCharger, *s)));
        all
    }

    pub fn has_station(&self, class: DeviceClass, station: u8) -> bool {
        match class {
            DeviceClass::Plant => station == self.plant_station,
            DeviceClass::Inverter => self.inverter_stations.contains(&station),
            DeviceClass::AcCharger => self.ac_charger_stations.contains(&station),
            DeviceClass::DcCharger => self.dc_charger_stations.contains(&station),
        }
    }

    /// Station ids must be unique across all device classes, and 0 is the
    /// broadcast address.
    pub fn validate_stations(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (class, station) in self.stations() {
            if station == 0 {
                bail!("{class} station id 0 is the broadcast address");
            }
            if !seen.insert(station) {
                bail!("station id {station} is assigned to more than one device");
            }
        }
        Ok(())
    }
}

/// Polling tier intervals and operation budgets. Tier ratios are derived
/// from the four intervals at startup.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PollingConfig {
    #[serde(default = "default_high_interval")]
    pub high_interval_seconds: u64,
    #[serde(default = "default_alarm_interval")]
    pub alarm_interval_seconds: u64,
    #[serde(default = "default_medium_interval")]
    pub medium_interval_seconds: u64,
    #[serde(default = "default_low_interval")]
    pub low_interval_seconds: u64,
    #[validate(range(min = 100))]
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
    #[validate(range(min = 1))]
    #[serde(default = "default_cycle_timeout")]
    pub cycle_timeout_seconds: u64,
}

impl PollingConfig {
    pub fn high_interval(&self) -> Duration {
        Duration::from_secs(self.high_interval_seconds)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("ESS__").split("__"));
        let mut cfg: Config = figment.extract()?;
        cfg.connection.validate()?;
        cfg.connection.validate_stations()?;
        cfg.polling.validate()?;

        if cfg.polling.high_interval_seconds == 0 {
            warn!(
                default = DEFAULT_HIGH_INTERVAL_SECONDS,
                "high-tier interval of zero rejected, using default"
            );
            cfg.polling.high_interval_seconds = DEFAULT_HIGH_INTERVAL_SECONDS;
        }
        Ok(cfg)
    }
}

fn default_plant_station() -> u8 {
    247
}

fn default_read_only() -> bool {
    true
}

fn default_high_interval() -> u64 {
    DEFAULT_HIGH_INTERVAL_SECONDS
}

fn default_alarm_interval() -> u64 {
    30
}

fn default_medium_interval() -> u64 {
    30
}

fn default_low_interval() -> u64 {
    600
}

fn default_operation_timeout() -> u64 {
    2000
}

fn default_cycle_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> ConnectionConfig {
        ConnectionConfig {
            host: "192.0.2.10".into(),
            port: 502,
            plant_station: 247,
            inverter_stations: vec![1, 2],
            ac_charger_stations: vec![3],
            dc_charger_stations: vec![],
            read_only: true,
        }
    }

    #[test]
    fn stations_enumerate_plant_first() {
        let cfg = connection();
        let stations = cfg.stations();
        assert_eq!(stations[0], (DeviceClass::Plant, 247));
        assert_eq!(stations.len(), 4);
        assert!(cfg.has_station(DeviceClass::Inverter, 2));
        assert!(!cfg.has_station(DeviceClass::Inverter, 3));
    }

    #[test]
    fn duplicate_station_ids_are_rejected() {
        let mut cfg = connection();
        cfg.ac_charger_stations = vec![2];
        assert!(cfg.validate_stations().is_err());
    }

    #[test]
    fn broadcast_station_id_is_rejected() {
        let mut cfg = connection();
        cfg.inverter_stations = vec![0];
        assert!(cfg.validate_stations().is_err());
    }
}
