//! Paginated configuration negotiation.
//!
//! The platform walks the user through the application's settings one page at
//! a time. Page ids are 1-based strings on the wire.

use appcycle_sdk::config::AppDefinition;
use appcycle_sdk::objects::{
    ConfigInit, ConfigInitData, ConfigPage, ConfigPageData, ConfigSection,
    ConfigurationInitResponse, ConfigurationPageResponse, ConfigurationRequest,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Page not found: {0}")]
    NotFound(usize),
    #[error("Invalid page id: {0:?}")]
    InvalidId(String),
    #[error("Application defines no configuration pages")]
    NoPages,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Neighbours and completion state of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLinks {
    pub page_id: usize,
    pub previous_page_id: Option<usize>,
    pub next_page_id: Option<usize>,
    pub complete: bool,
}

/// Computes page linkage for a fixed number of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigPageSequencer {
    total_pages: usize,
}

impl ConfigPageSequencer {
    pub fn new(total_pages: usize) -> Self {
        Self { total_pages }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn links(&self, page_id: usize) -> Result<PageLinks, PageError> {
        if self.total_pages == 0 {
            return Err(PageError::NoPages);
        }
        if page_id < 1 || page_id > self.total_pages {
            return Err(PageError::NotFound(page_id));
        }
        Ok(PageLinks {
            page_id,
            previous_page_id: (page_id > 1).then(|| page_id - 1),
            next_page_id: (page_id < self.total_pages).then(|| page_id + 1),
            complete: page_id >= self.total_pages,
        })
    }
}

/// Parse a wire page id.
pub fn parse_page_id(raw: &str) -> Result<usize, PageError> {
    raw.trim()
        .parse()
        .map_err(|_| PageError::InvalidId(raw.to_string()))
}

pub fn build_init_response(
    definition: &AppDefinition,
    first_page_id: usize,
) -> ConfigurationInitResponse {
    ConfigurationInitResponse {
        configuration_data: ConfigInitData {
            initialize: ConfigInit {
                id: definition.id.clone(),
                name: definition.name.clone(),
                description: definition.description.clone(),
                permissions: definition.permissions.clone(),
                first_page_id: first_page_id.to_string(),
            },
        },
    }
}

pub fn build_page_response(
    links: PageLinks,
    name: impl Into<String>,
    sections: Vec<ConfigSection>,
) -> ConfigurationPageResponse {
    ConfigurationPageResponse {
        configuration_data: ConfigPageData {
            page: ConfigPage {
                page_id: links.page_id.to_string(),
                name: name.into(),
                previous_page_id: links.previous_page_id.map(|id| id.to_string()),
                next_page_id: links.next_page_id.map(|id| id.to_string()),
                complete: links.complete,
                sections,
            },
        },
    }
}

/// Produces the CONFIGURATION responses.
///
/// The default initialization names page 1 as the first page. Applications
/// with dynamic pages implement [`handle_page`](ConfigManager::handle_page)
/// themselves; everything else uses [`StaticConfigManager`].
#[async_trait]
pub trait ConfigManager: Send + Sync {
    async fn handle_initialize(
        &self,
        _request: &ConfigurationRequest,
        definition: &AppDefinition,
    ) -> Result<ConfigurationInitResponse, PageError> {
        Ok(build_init_response(definition, 1))
    }

    async fn handle_page(
        &self,
        request: &ConfigurationRequest,
        definition: &AppDefinition,
        page_id: usize,
    ) -> Result<ConfigurationPageResponse, PageError>;
}

/// Serves the pages declared in the application definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticConfigManager;

#[async_trait]
impl ConfigManager for StaticConfigManager {
    async fn handle_page(
        &self,
        _request: &ConfigurationRequest,
        definition: &AppDefinition,
        page_id: usize,
    ) -> Result<ConfigurationPageResponse, PageError> {
        let links = ConfigPageSequencer::new(definition.page_count()).links(page_id)?;
        let page = definition
            .page(page_id)
            .ok_or(PageError::NotFound(page_id))?;
        Ok(build_page_response(
            links,
            page.page_name.clone(),
            page.sections.clone(),
        ))
    }
}
