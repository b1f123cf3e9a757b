//! Key server client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{KeyError, KeyFetcher};

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Total attempts per fetch, including the first.
const MAX_ATTEMPTS: u32 = 5;

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Fetches PEM keys over HTTP, retrying transport errors and error statuses.
pub struct HttpKeyFetcher {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpKeyFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    /// `<base>/<key id>`. Key ids are URL-safe and start with `/`.
    pub fn key_url(&self, key_id: &str) -> String {
        format!("{}/{}", self.base_url, key_id.trim_start_matches('/'))
    }

    async fn fetch_once(&self, key_id: &str, url: &str) -> Result<String, KeyError> {
        let request_error = |source: reqwest::Error| KeyError::Request {
            key_id: key_id.to_string(),
            source,
        };
        let response = self.http_client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(KeyError::Status {
                key_id: key_id.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(request_error)
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    async fn fetch(&self, key_id: &str) -> Result<String, KeyError> {
        let url = self.key_url(key_id);
        let mut attempt = 0;
        loop {
            match self.fetch_once(key_id, &url).await {
                Ok(pem) => {
                    debug!(key_id = %key_id, url = %url, "Fetched signing key");
                    return Ok(pem);
                }
                Err(e) if attempt + 1 < MAX_ATTEMPTS => {
                    let delay = calculate_retry_delay(attempt);
                    warn!(
                        key_id = %key_id,
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Key retrieval failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Delay before retry number `attempt + 1`: 250 ms doubling up to 2 s.
pub fn calculate_retry_delay(attempt: u32) -> Duration {
    INITIAL_BACKOFF
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_BACKOFF)
}
