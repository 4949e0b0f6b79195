//! Everything [`create_server`](super::create_server) needs before binding.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use hunt_backend::inbound::http::state::HttpStatePorts;

/// Listener address, wired adapters, and the optional metrics registry.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ports: HttpStatePorts,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, ports: HttpStatePorts) -> Self {
        Self {
            bind_addr,
            ports,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Serve `/metrics` from `prometheus`; `None` leaves it unmounted.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
