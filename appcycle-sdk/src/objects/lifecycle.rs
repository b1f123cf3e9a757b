//! Inbound lifecycle requests.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::event::EventData;
use super::value::{ConfigMap, InstalledApp};
use crate::registry::{REQUEST_BY_PHASE, deserialize_variant};

/// Free-form settings echoed by the platform with most requests.
pub type Settings = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecyclePhase {
    Confirmation,
    Configuration,
    Install,
    Update,
    Uninstall,
    OauthCallback,
    Event,
}

impl LifecyclePhase {
    pub const ALL: [Self; 7] = [
        Self::Confirmation,
        Self::Configuration,
        Self::Install,
        Self::Update,
        Self::Uninstall,
        Self::OauthCallback,
        Self::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Confirmation => "CONFIRMATION",
            LifecyclePhase::Configuration => "CONFIGURATION",
            LifecyclePhase::Install => "INSTALL",
            LifecyclePhase::Update => "UPDATE",
            LifecyclePhase::Uninstall => "UNINSTALL",
            LifecyclePhase::OauthCallback => "OAUTH_CALLBACK",
            LifecyclePhase::Event => "EVENT",
        }
    }
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-phase of a CONFIGURATION request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigPhase {
    Initialize,
    Page,
}

/// Fields carried by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHeader {
    pub execution_id: String,
    pub locale: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationData {
    pub app_id: String,
    pub confirmation_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequestData {
    pub installed_app_id: String,
    pub phase: ConfigPhase,
    pub page_id: String,
    pub previous_page_id: String,
    pub config: ConfigMap,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallData {
    pub auth_token: String,
    pub refresh_token: String,
    pub installed_app: InstalledApp,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateData {
    pub auth_token: String,
    pub refresh_token: String,
    pub installed_app: InstalledApp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_config: Option<ConfigMap>,
    #[serde(default)]
    pub previous_permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallData {
    pub installed_app: InstalledApp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCallbackData {
    pub installed_app_id: String,
    pub url_path: String,
}

impl std::fmt::Debug for InstallData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallData")
            .field("installed_app", &self.installed_app)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for UpdateData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateData")
            .field("installed_app", &self.installed_app)
            .field("previous_config", &self.previous_config)
            .field("previous_permissions", &self.previous_permissions)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub lifecycle: LifecyclePhase,
    #[serde(flatten)]
    pub header: RequestHeader,
    pub app_id: String,
    pub confirmation_data: ConfirmationData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRequest {
    pub lifecycle: LifecyclePhase,
    #[serde(flatten)]
    pub header: RequestHeader,
    pub configuration_data: ConfigRequestData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
    pub lifecycle: LifecyclePhase,
    #[serde(flatten)]
    pub header: RequestHeader,
    pub install_data: InstallData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub lifecycle: LifecyclePhase,
    #[serde(flatten)]
    pub header: RequestHeader,
    pub update_data: UpdateData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallRequest {
    pub lifecycle: LifecyclePhase,
    #[serde(flatten)]
    pub header: RequestHeader,
    pub uninstall_data: UninstallData,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCallbackRequest {
    pub lifecycle: LifecyclePhase,
    #[serde(flatten)]
    pub header: RequestHeader,
    pub o_auth_callback_data: OauthCallbackData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub lifecycle: LifecyclePhase,
    #[serde(flatten)]
    pub header: RequestHeader,
    pub event_data: EventData,
    #[serde(default)]
    pub settings: Settings,
}

/// Any inbound request, selected by its `lifecycle` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LifecycleRequest {
    Confirmation(ConfirmationRequest),
    Configuration(ConfigurationRequest),
    Install(InstallRequest),
    Update(UpdateRequest),
    Uninstall(UninstallRequest),
    OauthCallback(OauthCallbackRequest),
    Event(EventRequest),
}

impl LifecycleRequest {
    pub fn phase(&self) -> LifecyclePhase {
        match self {
            LifecycleRequest::Confirmation(r) => r.lifecycle,
            LifecycleRequest::Configuration(r) => r.lifecycle,
            LifecycleRequest::Install(r) => r.lifecycle,
            LifecycleRequest::Update(r) => r.lifecycle,
            LifecycleRequest::Uninstall(r) => r.lifecycle,
            LifecycleRequest::OauthCallback(r) => r.lifecycle,
            LifecycleRequest::Event(r) => r.lifecycle,
        }
    }

    pub fn header(&self) -> &RequestHeader {
        match self {
            LifecycleRequest::Confirmation(r) => &r.header,
            LifecycleRequest::Configuration(r) => &r.header,
            LifecycleRequest::Install(r) => &r.header,
            LifecycleRequest::Update(r) => &r.header,
            LifecycleRequest::Uninstall(r) => &r.header,
            LifecycleRequest::OauthCallback(r) => &r.header,
            LifecycleRequest::Event(r) => &r.header,
        }
    }
}

impl<'de> Deserialize<'de> for LifecycleRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_variant(&REQUEST_BY_PHASE, deserializer)
    }
}
