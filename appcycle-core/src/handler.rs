//! Application callbacks, one per lifecycle phase.

use appcycle_sdk::objects::{
    ConfigurationRequest, ConfirmationRequest, EventRequest, InstallRequest, OauthCallbackRequest,
    UninstallRequest, UpdateRequest,
};
use async_trait::async_trait;

/// Business logic invoked by the dispatcher after a request has been decoded
/// and verified.
///
/// Every phase is delivered, including CONFIRMATION and CONFIGURATION, whose
/// responses the dispatcher builds on its own. Returning an error aborts the
/// dispatch with an internal error. Persisting anything across calls is up to
/// the implementation.
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    async fn handle_confirmation(
        &self,
        correlation_id: Option<&str>,
        request: &ConfirmationRequest,
    ) -> anyhow::Result<()>;

    async fn handle_configuration(
        &self,
        correlation_id: Option<&str>,
        request: &ConfigurationRequest,
    ) -> anyhow::Result<()>;

    async fn handle_install(
        &self,
        correlation_id: Option<&str>,
        request: &InstallRequest,
    ) -> anyhow::Result<()>;

    async fn handle_update(
        &self,
        correlation_id: Option<&str>,
        request: &UpdateRequest,
    ) -> anyhow::Result<()>;

    async fn handle_uninstall(
        &self,
        correlation_id: Option<&str>,
        request: &UninstallRequest,
    ) -> anyhow::Result<()>;

    async fn handle_oauth_callback(
        &self,
        correlation_id: Option<&str>,
        request: &OauthCallbackRequest,
    ) -> anyhow::Result<()>;

    async fn handle_event(
        &self,
        correlation_id: Option<&str>,
        request: &EventRequest,
    ) -> anyhow::Result<()>;
}
