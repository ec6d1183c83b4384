use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use crate::error_handler::{AppError, AppResult};

/// How the HTTP surface is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    /// Long-running server: `/`, `/ask`, `/health`, startup probe.
    Server,
    /// The serverless handler mounted at `/api/ask`, built lazily on first call.
    Function,
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayMode::Server => f.write_str("server"),
            RelayMode::Function => f.write_str("function"),
        }
    }
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address, e.g. `0.0.0.0` or `::`.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    pub mode: RelayMode,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 3000;

    /// Reads `HOST`, `PORT` and `RELAY_MODE` from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = match get("HOST").as_deref() {
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some("localhost") => IpAddr::V4(Ipv4Addr::LOCALHOST),
            Some(h) => h
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .map_err(|_| AppError::InvalidEnv {
                    var: "HOST",
                    reason: "expected an IPv4 or IPv6 address",
                })?,
        };

        let port = match get("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| AppError::InvalidEnv {
                var: "PORT",
                reason: "expected u16 (0..=65535)",
            })?,
            None => Self::DEFAULT_PORT,
        };

        let mode = match get("RELAY_MODE").map(|m| m.to_ascii_lowercase()).as_deref() {
            None | Some("server") => RelayMode::Server,
            Some("function") | Some("serverless") => RelayMode::Function,
            Some(_) => {
                return Err(AppError::InvalidEnv {
                    var: "RELAY_MODE",
                    reason: "expected `server` or `function`",
                });
            }
        };

        Ok(Self { host, port, mode })
    }

    /// Socket address for the listener.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
