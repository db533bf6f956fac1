use anyhow::Result;
use axum::Router;
use ess_monitor::{api, config, device, telemetry};

use config::Config;
use device::EssDevice;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    if cfg.connection.read_only {
        info!("read-only mode: parameter writes are disabled");
    } else {
        warn!("write mode enabled - parameter writes will mutate the plant");
    }

    let (ess, poller) = EssDevice::new(&cfg)?;
    info!(
        endpoint = %format!("{}:{}", cfg.connection.host, cfg.connection.port),
        plant = cfg.connection.plant_station,
        inverters = cfg.connection.inverter_stations.len(),
        ac_chargers = cfg.connection.ac_charger_stations.len(),
        dc_chargers = cfg.connection.dc_charger_stations.len(),
        "device context created"
    );

    tokio::spawn(poller.run());

    let app: Router = api::router(ess.clone());
    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "server binding to 0.0.0.0 - the snapshot and write API will be \
            reachable from the network"
        );
    }

    info!(%addr, "starting ess-monitor");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    ess.shutdown().await;
    warn!("shutdown complete");
    Ok(())
}
