//! Backend entry-point: loads settings, wires adapters, and serves the API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hunt_backend::inbound::http::health::HealthState;
use hunt_backend::settings::{AppSettings, BuildMode};
#[cfg(feature = "metrics")]
use server::make_metrics;
use server::{ServerConfig, build_http_ports, build_pool, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_env().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let pool = build_pool(&settings).await?;
    let ports =
        build_http_ports(&settings, pool.as_ref(), BuildMode::from_debug_assertions()).await?;

    let config = ServerConfig::new(bind_addr, ports);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(make_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    let drain_state = health_state.clone();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            drain_state.mark_draining();
            info!("shutdown requested; draining");
            handle.stop(true).await;
        }
    });

    let result = server.await;
    health_state.mark_draining();
    drop(pool);
    result
}
