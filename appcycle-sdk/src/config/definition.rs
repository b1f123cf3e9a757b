//! Static description of the application served by a dispatcher.

use serde::{Deserialize, Serialize};

use crate::objects::ConfigSection;

/// One configuration page as declared by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigPage {
    pub page_name: String,
    pub sections: Vec<ConfigSection>,
}

/// The application's identity and its configuration pages.
///
/// Decoded with the wire naming, so definition files use `targetUrl`,
/// `configPages` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Public URL the platform posts to. Its path and query form the
    /// `(request-target)` of signed requests.
    pub target_url: String,
    pub permissions: Vec<String>,
    #[serde(default)]
    pub config_pages: Vec<AppConfigPage>,
}

impl AppDefinition {
    /// The 1-based page, if it exists.
    pub fn page(&self, page_id: usize) -> Option<&AppConfigPage> {
        page_id
            .checked_sub(1)
            .and_then(|index| self.config_pages.get(index))
    }

    pub fn page_count(&self) -> usize {
        self.config_pages.len()
    }
}
