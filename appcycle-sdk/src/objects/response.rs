//! Outbound lifecycle responses. Only ever built locally, never decoded from
//! untrusted input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::setting::ConfigSection;

/// Body of the content-free acknowledgments.
pub type EmptyPayload = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResponse {
    pub target_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub first_page_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInitData {
    pub initialize: ConfigInit,
}

/// One page of the configuration negotiation. Page ids are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPage {
    pub page_id: String,
    pub name: String,
    pub previous_page_id: Option<String>,
    pub next_page_id: Option<String>,
    pub complete: bool,
    pub sections: Vec<ConfigSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPageData {
    pub page: ConfigPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationInitResponse {
    pub configuration_data: ConfigInitData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationPageResponse {
    pub configuration_data: ConfigPageData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallResponse {
    pub install_data: EmptyPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub update_data: EmptyPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallResponse {
    pub uninstall_data: EmptyPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthCallbackResponse {
    pub o_auth_callback_data: EmptyPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_data: EmptyPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LifecycleResponse {
    Confirmation(ConfirmationResponse),
    ConfigurationInit(ConfigurationInitResponse),
    ConfigurationPage(ConfigurationPageResponse),
    Install(InstallResponse),
    Update(UpdateResponse),
    Uninstall(UninstallResponse),
    OauthCallback(OauthCallbackResponse),
    Event(EventResponse),
}
