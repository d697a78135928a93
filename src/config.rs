use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono_tz::Tz;
use tracing::warn;

use crate::dates::DEFAULT_TZ;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORE_FILE: &str = "liga25.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding `public/`, `src/` and `data/`.
    pub root: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Invalid PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        let root = lookup("LIGA_ROOT")
            .filter(|r| !r.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { port, root }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub store_path: PathBuf,
    pub tz: Tz,
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store_path = lookup("LIGA_STORE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));
        let tz = match lookup("LIGA_TZ") {
            Some(raw) => raw.trim().parse::<Tz>().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Unknown LIGA_TZ, using default");
                DEFAULT_TZ
            }),
            None => DEFAULT_TZ,
        };
        Self { store_path, tz }
    }
}
