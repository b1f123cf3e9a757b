//! TOML file configuration structures.
//!
//! These structs directly map to the `appcycle.toml` file format.

use appcycle_sdk::config::DispatcherConfig;
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dispatcher: DispatcherSection,
    /// Application definition file, relative to the configuration file.
    pub definition: PathBuf,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// `[dispatcher]` section.
///
/// TOML has no null, so an unbounded clock skew is spelled
/// `unbounded_clock_skew = true`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatcherSection {
    #[serde(flatten)]
    pub options: DispatcherConfig,
    #[serde(default)]
    pub unbounded_clock_skew: bool,
}

impl DispatcherSection {
    pub fn into_config(self) -> DispatcherConfig {
        let mut config = self.options;
        if self.unbounded_clock_skew {
            config.clock_skew_secs = None;
        }
        config
    }
}
