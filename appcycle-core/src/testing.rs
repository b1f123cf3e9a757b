//! Fixtures shared by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use appcycle_sdk::objects::{
    ConfigurationRequest, ConfirmationRequest, EventRequest, InstallRequest, LifecyclePhase,
    OauthCallbackRequest, UninstallRequest, UpdateRequest,
};
use async_trait::async_trait;

use crate::handler::LifecycleHandler;
use crate::keys::{KeyError, KeyFetcher};

// Joyent HTTP signature scheme test vectors.

pub const PUBLIC_SIGNING_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQDCFENGw33yGihy92pDjZQhl0C3
6rPJj+CvfSC8+q28hxA161QFNUd13wuCTUcq0Qd2qsBe/2hFyc2DCJJg0h1L78+6
Z4UMR7EOcpfdUE9Hf3m/hs+FUR45uBJeDK1HSFHD8bHKD6kv8FPGfJTotc+2xjJw
oYi+1hqp1fIekaxsyQIDAQAB
-----END PUBLIC KEY-----
";

pub const WRONG_SIGNING_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQDTt945+S+6dhkvVQXH4E4Dy6hc
KqQ5Z4FSvwfXnu23sZ15A9vx43imVJE5bS0H6n893nh9RNvrYp98nGcQLLVhvdTq
wIpl+cWCurqGtwkAAqmNjXwCbj69hUHGXtqX3Jn5MKB5IghjEDU4N3dFGoCWWycb
4l8BNIcle/5s7Vo9vwIDAQAB
-----END PUBLIC KEY-----
";

pub const DEFAULT_AUTHORIZATION: &str = r#"Signature keyId="Test",algorithm="rsa-sha256",signature="jKyvPcxB4JbmYY4mByyBY7cZfNl4OW9HpFQlG7N4YcJPteKTu4MWCLyk+gIr0wDgqtLWf9NLpMAMimdfsH7FSWGfbMFSrsVTHNTk0rK3usrfFnti1dxsM4jl0kYJCKTGI/UWkqiaxwNiKqGcdlEDrTcUhhsFsOIo8VhddmZTZ8w=""#;

pub const ALL_HEADERS_AUTHORIZATION: &str = r#"Signature keyId="Test",algorithm="rsa-sha256",headers="(request-target) host date content-type digest content-length",signature="Ef7MlxLXoBovhil3AlyjtBwAL9g4TN3tibLj7uuNB3CROat/9KaeQ4hW2NiJ+pZ6HQEOx9vYZAyi+7cmIkmJszJCut5kQLAwuX+Ms/mUFvpKlSo9StS2bMXDBNjOh4Auj774GFj4gwjS+3NhFeoqyr/MuN6HsEnkvn6zdgfE2i0=""#;

pub const TARGET_URL: &str = "https://example.com/foo?param=value&pet=dog";
pub const SIGNED_BODY: &str = r#"{"hello": "world"}"#;
pub const SIGNED_DATE: &str = "Thu, 05 Jan 2014 21:31:40 GMT";
pub const SIGNED_DIGEST: &str = "SHA-256=X48E9qOokqqrvdts8nOJRJN3OWDUoyWxBf7kbu9DBPE=";

/// Headers of the signed test request, minus `Authorization`.
pub fn signed_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Host", "example.com"),
        ("Date", SIGNED_DATE),
        ("Content-Type", "application/json"),
        ("Digest", SIGNED_DIGEST),
        ("Content-Length", "18"),
    ]
}

// An UNINSTALL request signed over `(request-target) digest date` with a
// 2048-bit key, same target URL and date as above.

pub const LIFECYCLE_SIGNING_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAp5DQGJZq2viTRvY4UqCT
ThUFReWYmkkFQ27UIwe33rxG/3fBkfQCsqUDZGgzZXhK8/lYdrg+KzmG+ibEyAd5
OSoLtD7Kt0tpgET53S4wHWKKOQRpNSGeypTvLe8vfcYFyFXMsTzrOF9BMnUavfXm
dA8pRN0j9K41vOywTJBmG5srDbJcv0tjyRKW+y+3wL0vcn552V2O8+4gftlp9plW
B5gnSyaFTXWpnVTw9lNs6mQPbjIooStS4TbOMz18Ysq4rOQFfXwEqHRWA7bdGG8X
ovX6rArnVwgRvJvokNLYLsl+8sxLWWutIuT9sjLAd/XTHtEwJFITwlFwmkTH0aOr
7QIDAQAB
-----END PUBLIC KEY-----
";

pub const LIFECYCLE_BODY: &str = r#"{"lifecycle":"UNINSTALL","executionId":"exec","locale":"en","version":"0.1.0","uninstallData":{"installedApp":{"installedAppId":"installed","locationId":"location","config":{}}}}"#;

pub const LIFECYCLE_DIGEST: &str = "SHA-256=T6Uq9NloNS+/xhZdW3jo1i1UvScgU56CMDOciqydy/I=";

pub const LIFECYCLE_AUTHORIZATION: &str = r#"Signature keyId="/pl/useast2/test",algorithm="rsa-sha256",headers="(request-target) digest date",signature="Rop08w6S9p+sHycIYoiHycnaMH2sphEP4Wl/GcCfcAthZsWXcWubAyRgqMVloFdGdXNp/fM8oY3zfX2mP+mkj5+h2WcyPxjNrwIkvnKy0956dzq0apUVBDpA7EEyMVz/X8QG91s2kPBm9xzIVxu0RSSObnuJNy7IjTrUVrtwd7185ih1VEVOb5v23iZgcFYHPO92fAomvec0OrF2dHuwTT/GpLqaXzrI4DYfTLPhqLYVwYFKmOp1GVH3bZYsDU26ytmbkHA9L1H+EJFFbdFNW35DSEQ1R7MfNlP0GCU+S7HBLJbPr40+ED+CUQcRd8xkmdFjWylK7NIc0UWLv+iJwQ==""#;

/// All headers of the signed UNINSTALL request.
pub fn lifecycle_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Date", SIGNED_DATE),
        ("Digest", LIFECYCLE_DIGEST),
        ("Authorization", LIFECYCLE_AUTHORIZATION),
        ("X-ST-Correlation", "abc123"),
    ]
}

/// Serves one PEM for every key id and counts calls.
pub struct CountingFetcher {
    pem: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(pem: &str) -> Self {
        Self {
            pem: Some(pem.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers every fetch with a 404.
    pub fn failing() -> Self {
        Self {
            pem: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyFetcher for CountingFetcher {
    async fn fetch(&self, key_id: &str) -> Result<String, KeyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.pem.clone().ok_or_else(|| KeyError::Status {
            key_id: key_id.to_string(),
            status: 404,
        })
    }
}

/// Records which phases were delivered. Optionally fails every call.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<(LifecyclePhase, Option<String>)>>,
    fail: bool,
}

impl RecordingHandler {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(LifecyclePhase, Option<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, phase: LifecyclePhase, correlation_id: Option<&str>) -> anyhow::Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((phase, correlation_id.map(str::to_string)));
        }
        if self.fail {
            anyhow::bail!("handler failed for {phase}");
        }
        Ok(())
    }
}

#[async_trait]
impl LifecycleHandler for RecordingHandler {
    async fn handle_confirmation(
        &self,
        correlation_id: Option<&str>,
        _request: &ConfirmationRequest,
    ) -> anyhow::Result<()> {
        self.record(LifecyclePhase::Confirmation, correlation_id)
    }

    async fn handle_configuration(
        &self,
        correlation_id: Option<&str>,
        _request: &ConfigurationRequest,
    ) -> anyhow::Result<()> {
        self.record(LifecyclePhase::Configuration, correlation_id)
    }

    async fn handle_install(
        &self,
        correlation_id: Option<&str>,
        _request: &InstallRequest,
    ) -> anyhow::Result<()> {
        self.record(LifecyclePhase::Install, correlation_id)
    }

    async fn handle_update(
        &self,
        correlation_id: Option<&str>,
        _request: &UpdateRequest,
    ) -> anyhow::Result<()> {
        self.record(LifecyclePhase::Update, correlation_id)
    }

    async fn handle_uninstall(
        &self,
        correlation_id: Option<&str>,
        _request: &UninstallRequest,
    ) -> anyhow::Result<()> {
        self.record(LifecyclePhase::Uninstall, correlation_id)
    }

    async fn handle_oauth_callback(
        &self,
        correlation_id: Option<&str>,
        _request: &OauthCallbackRequest,
    ) -> anyhow::Result<()> {
        self.record(LifecyclePhase::OauthCallback, correlation_id)
    }

    async fn handle_event(
        &self,
        correlation_id: Option<&str>,
        _request: &EventRequest,
    ) -> anyhow::Result<()> {
        self.record(LifecyclePhase::Event, correlation_id)
    }
}
