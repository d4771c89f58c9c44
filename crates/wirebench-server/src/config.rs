use std::{
    net::{SocketAddr, ToSocketAddrs},
    time::Duration,
};

use crate::{ServerError, http::MAX_BODY_BYTES};

/// Per-worker HTTP settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bodies above this size are answered with 413.
    pub max_body_bytes: usize,
    /// Time allowed for in-flight requests after a shutdown signal.
    pub shutdown_grace: Duration,
    /// Bind with `SO_REUSEPORT` so every worker can share the port.
    pub reuse_port: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_body_bytes: MAX_BODY_BYTES,
            shutdown_grace: Duration::from_secs(5),
            reuse_port: true,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.host.trim().is_empty() {
            return Err(ServerError::InvalidConfig("host cannot be empty".into()));
        }
        if self.max_body_bytes == 0 {
            return Err(ServerError::InvalidConfig(
                "max body size must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolve `host:port`; IPv6 literals may be given with or without brackets.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let host = self.host.trim().trim_start_matches('[').trim_end_matches(']');
        let display = format!("{host}:{}", self.port);

        (host, self.port)
            .to_socket_addrs()
            .map_err(|source| ServerError::Bind {
                addr: display.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ServerError::InvalidConfig(format!("'{display}' resolved to nothing")))
    }
}

/// Worker count when none is configured.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
