//! Dispatcher options.

use serde::{Deserialize, Serialize};

pub const DEFAULT_KEYSERVER_URL: &str = "https://key.smartthings.com";
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 300;

/// Options controlling request verification and logging.
///
/// Every option has a default; unknown keys are ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Verify the HTTP signature of every request.
    pub check_signatures: bool,
    /// Maximum allowed difference between the request date and now, in
    /// seconds. `None` accepts any skew.
    pub clock_skew_secs: Option<u64>,
    /// Base URL of the key server that serves signing keys.
    pub keyserver_url: String,
    /// Log raw request bodies at debug level.
    ///
    /// Raw bodies contain auth and refresh tokens. Enabling this puts secrets
    /// in the logs.
    pub log_raw_body: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            check_signatures: true,
            clock_skew_secs: Some(DEFAULT_CLOCK_SKEW_SECS),
            keyserver_url: DEFAULT_KEYSERVER_URL.to_string(),
            log_raw_body: false,
        }
    }
}
