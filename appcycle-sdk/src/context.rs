//! Immutable view over one inbound request.

use std::collections::HashMap;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const CORRELATION_ID_HEADER: &str = "x-st-correlation";
pub const DATE_HEADER: &str = "date";

/// Request headers (looked up case-insensitively) and the raw body.
#[derive(Clone, Default)]
pub struct RequestContext {
    headers: HashMap<String, String>,
    body: String,
}

impl RequestContext {
    pub fn new<I, K, V>(headers: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
            .collect();
        Self {
            headers,
            body: body.into(),
        }
    }

    /// A header by name, case-insensitively. Blank values count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.header(CORRELATION_ID_HEADER)
    }

    pub fn signature(&self) -> Option<&str> {
        self.header(AUTHORIZATION_HEADER)
    }

    pub fn date(&self) -> Option<&str> {
        self.header(DATE_HEADER)
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("correlation_id", &self.correlation_id())
            .field("date", &self.date())
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}
