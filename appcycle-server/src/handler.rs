//! Lifecycle callbacks of the stand-alone server: log and acknowledge.

use appcycle_core::LifecycleHandler;
use appcycle_sdk::objects::{
    AppScoped, ConfigurationRequest, ConfirmationRequest, EventRequest, InstallRequest,
    OauthCallbackRequest, UninstallRequest, UpdateRequest,
};
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

#[async_trait]
impl LifecycleHandler for LoggingHandler {
    async fn handle_confirmation(
        &self,
        correlation_id: Option<&str>,
        request: &ConfirmationRequest,
    ) -> anyhow::Result<()> {
        info!(
            correlation_id = ?correlation_id,
            app_id = %request.app_id,
            "Confirmation requested"
        );
        Ok(())
    }

    async fn handle_configuration(
        &self,
        correlation_id: Option<&str>,
        request: &ConfigurationRequest,
    ) -> anyhow::Result<()> {
        let data = &request.configuration_data;
        info!(
            correlation_id = ?correlation_id,
            installed_app_id = %data.installed_app_id,
            phase = ?data.phase,
            page_id = %data.page_id,
            "Configuration requested"
        );
        Ok(())
    }

    async fn handle_install(
        &self,
        correlation_id: Option<&str>,
        request: &InstallRequest,
    ) -> anyhow::Result<()> {
        info!(
            correlation_id = ?correlation_id,
            installed_app_id = %request.app_id(),
            location_id = %request.location_id(),
            "Installed"
        );
        Ok(())
    }

    async fn handle_update(
        &self,
        correlation_id: Option<&str>,
        request: &UpdateRequest,
    ) -> anyhow::Result<()> {
        info!(
            correlation_id = ?correlation_id,
            installed_app_id = %request.app_id(),
            location_id = %request.location_id(),
            "Updated"
        );
        Ok(())
    }

    async fn handle_uninstall(
        &self,
        correlation_id: Option<&str>,
        request: &UninstallRequest,
    ) -> anyhow::Result<()> {
        info!(
            correlation_id = ?correlation_id,
            installed_app_id = %request.app_id(),
            "Uninstalled"
        );
        Ok(())
    }

    async fn handle_oauth_callback(
        &self,
        correlation_id: Option<&str>,
        request: &OauthCallbackRequest,
    ) -> anyhow::Result<()> {
        info!(
            correlation_id = ?correlation_id,
            installed_app_id = %request.o_auth_callback_data.installed_app_id,
            url_path = %request.o_auth_callback_data.url_path,
            "OAuth callback"
        );
        Ok(())
    }

    async fn handle_event(
        &self,
        correlation_id: Option<&str>,
        request: &EventRequest,
    ) -> anyhow::Result<()> {
        let events = &request.event_data.events;
        info!(
            correlation_id = ?correlation_id,
            installed_app_id = %request.app_id(),
            count = events.len(),
            "Events received"
        );
        for event in events {
            tracing::debug!(correlation_id = ?correlation_id, event_type = ?event.event_type, "Event");
        }
        Ok(())
    }
}
