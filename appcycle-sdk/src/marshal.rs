//! JSON / YAML marshaling of wire records.
//!
//! Both formats share one step: record ↔ [`serde_json::Value`]. Only the final
//! tree ↔ text step differs. A [`Marshaler`] is a plain value owned by whoever
//! needs it; there is no global instance.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::naming::wire_table;

/// In-memory fields whose values must never appear in diagnostic output.
const SECRET_FIELDS: &[&str] = &["auth_token", "refresh_token"];

lazy_static! {
    /// Wire name → field id of every field dropped from diagnostics.
    static ref SECRET_WIRE_NAMES: HashMap<String, &'static str> = wire_table(SECRET_FIELDS);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    #[error("Failed to decode {format:?}: {message}")]
    Decode { format: WireFormat, message: String },
    #[error("Failed to encode {format:?}: {message}")]
    Encode { format: WireFormat, message: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Marshaler {
    format: WireFormat,
}

impl Marshaler {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    pub fn json() -> Self {
        Self::new(WireFormat::Json)
    }

    pub fn yaml() -> Self {
        Self::new(WireFormat::Yaml)
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Encode a record for the wire. Secrets are included.
    pub fn encode<T: Serialize>(&self, record: &T) -> Result<String, MarshalError> {
        let tree = serde_json::to_value(record).map_err(|e| self.encode_error(e))?;
        match self.format {
            WireFormat::Json => serde_json::to_string_pretty(&tree).map_err(|e| self.encode_error(e)),
            WireFormat::Yaml => serde_yaml::to_string(&tree).map_err(|e| self.encode_error(e)),
        }
    }

    /// Decode a record. Syntax errors, unknown discriminators and missing
    /// fields all surface as [`MarshalError::Decode`].
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, MarshalError> {
        let tree: Value = match self.format {
            WireFormat::Json => serde_json::from_str(text).map_err(|e| self.decode_error(e))?,
            WireFormat::Yaml => serde_yaml::from_str(text).map_err(|e| self.decode_error(e))?,
        };
        serde_json::from_value(tree).map_err(|e| self.decode_error(e))
    }

    /// Compact single-line JSON for logs, with token values removed at any
    /// depth. Not a wire encoding.
    pub fn diagnostic<T: Serialize>(&self, record: &T) -> Result<String, MarshalError> {
        let mut tree = serde_json::to_value(record).map_err(|e| self.encode_error(e))?;
        redact(&mut tree, &SECRET_WIRE_NAMES);
        serde_json::to_string(&tree).map_err(|e| self.encode_error(e))
    }

    fn decode_error(&self, e: impl std::fmt::Display) -> MarshalError {
        MarshalError::Decode {
            format: self.format,
            message: e.to_string(),
        }
    }

    fn encode_error(&self, e: impl std::fmt::Display) -> MarshalError {
        MarshalError::Encode {
            format: self.format,
            message: e.to_string(),
        }
    }
}

fn redact(tree: &mut Value, secrets: &HashMap<String, &'static str>) {
    match tree {
        Value::Object(map) => {
            map.retain(|key, _| !secrets.contains_key(key));
            map.values_mut().for_each(|v| redact(v, secrets));
        }
        Value::Array(items) => items.iter_mut().for_each(|v| redact(v, secrets)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::to_wire_name;
    use crate::objects::{
        ConfigPhase, ConfigValue, ConfigurationRequest, ConfirmationRequest, EventRequest,
        InstallRequest, LifecyclePhase, LifecycleRequest, OauthCallbackRequest, UninstallRequest,
        UpdateRequest,
    };
    use rstest::rstest;
    use serde_json::json;

    fn installed_app() -> Value {
        json!({
            "installedAppId": "5f0a7a8e-app",
            "locationId": "e675a3d9-loc",
            "config": {
                "switches": [
                    {"valueType": "DEVICE", "deviceConfig": {"deviceId": "dev-1", "componentId": "main"}}
                ],
                "label": [{"valueType": "STRING", "stringConfig": {"value": "porch"}}]
            },
            "permissions": ["r:devices:*"]
        })
    }

    fn header(phase: &str) -> Value {
        json!({"lifecycle": phase, "executionId": "exec-1", "locale": "en", "version": "0.1.0"})
    }

    fn with(mut base: Value, extra: Value) -> Value {
        if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
            base.extend(extra);
        }
        base
    }

    fn request(phase: &str) -> Value {
        let body = match phase {
            "CONFIRMATION" => json!({
                "appId": "app-id",
                "confirmationData": {"appId": "app-id", "confirmationUrl": "https://example.com/confirm"},
                "settings": {}
            }),
            "CONFIGURATION" => json!({
                "configurationData": {
                    "installedAppId": "5f0a7a8e-app",
                    "phase": "PAGE",
                    "pageId": "1",
                    "previousPageId": "",
                    "config": {}
                },
                "settings": {}
            }),
            "INSTALL" => json!({
                "installData": {"authToken": "auth", "refreshToken": "refresh", "installedApp": installed_app()},
                "settings": {}
            }),
            "UPDATE" => json!({
                "updateData": {
                    "authToken": "auth",
                    "refreshToken": "refresh",
                    "installedApp": installed_app(),
                    "previousConfig": {"label": [{"valueType": "STRING", "stringConfig": {"value": "old"}}]},
                    "previousPermissions": ["r:devices:*"]
                },
                "settings": {}
            }),
            "UNINSTALL" => json!({"uninstallData": {"installedApp": installed_app()}, "settings": {}}),
            "OAUTH_CALLBACK" => json!({
                "oAuthCallbackData": {"installedAppId": "5f0a7a8e-app", "urlPath": "/callback?code=1"}
            }),
            "EVENT" => json!({
                "eventData": {
                    "authToken": "auth",
                    "installedApp": installed_app(),
                    "events": [{
                        "eventTime": "2024-05-01T12:30:45.123Z",
                        "eventType": "DEVICE_EVENT",
                        "deviceEvent": {"deviceId": "dev-1", "value": "on"}
                    }]
                },
                "settings": {"custom": 1}
            }),
            _ => json!({}),
        };
        with(header(phase), body)
    }

    #[rstest]
    #[case("CONFIRMATION", LifecyclePhase::Confirmation)]
    #[case("CONFIGURATION", LifecyclePhase::Configuration)]
    #[case("INSTALL", LifecyclePhase::Install)]
    #[case("UPDATE", LifecyclePhase::Update)]
    #[case("UNINSTALL", LifecyclePhase::Uninstall)]
    #[case("OAUTH_CALLBACK", LifecyclePhase::OauthCallback)]
    #[case("EVENT", LifecyclePhase::Event)]
    fn every_request_round_trips(
        #[case] tag: &str,
        #[case] phase: LifecyclePhase,
        #[values(Marshaler::json(), Marshaler::yaml())] marshaler: Marshaler,
    ) {
        let text = serde_json::to_string(&request(tag)).unwrap();
        let decoded: LifecycleRequest = Marshaler::json().decode(&text).unwrap();
        assert_eq!(decoded.phase(), phase);

        let encoded = marshaler.encode(&decoded).unwrap();
        let again: LifecycleRequest = marshaler.decode(&encoded).unwrap();
        assert_eq!(again, decoded);
    }

    #[test]
    fn decoded_variant_matches_phase() {
        let decode = |tag: &str| -> LifecycleRequest {
            Marshaler::json()
                .decode(&request(tag).to_string())
                .unwrap()
        };
        assert!(matches!(decode("CONFIRMATION"), LifecycleRequest::Confirmation(ConfirmationRequest { .. })));
        assert!(matches!(decode("INSTALL"), LifecycleRequest::Install(InstallRequest { .. })));
        assert!(matches!(decode("UPDATE"), LifecycleRequest::Update(UpdateRequest { .. })));
        assert!(matches!(decode("UNINSTALL"), LifecycleRequest::Uninstall(UninstallRequest { .. })));
        assert!(matches!(decode("OAUTH_CALLBACK"), LifecycleRequest::OauthCallback(OauthCallbackRequest { .. })));
        assert!(matches!(decode("EVENT"), LifecycleRequest::Event(EventRequest { .. })));
        match decode("CONFIGURATION") {
            LifecycleRequest::Configuration(ConfigurationRequest { configuration_data, .. }) => {
                assert_eq!(configuration_data.phase, ConfigPhase::Page);
                assert_eq!(configuration_data.page_id, "1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wire_encoding_keeps_tokens() {
        let decoded: LifecycleRequest = Marshaler::json()
            .decode(&request("INSTALL").to_string())
            .unwrap();
        let encoded = Marshaler::json().encode(&decoded).unwrap();
        assert!(encoded.contains("\"authToken\": \"auth\""));
        assert!(encoded.contains("\"refreshToken\": \"refresh\""));
    }

    #[test]
    fn diagnostic_drops_tokens() {
        let decoded: LifecycleRequest = Marshaler::json()
            .decode(&request("UPDATE").to_string())
            .unwrap();
        let rendered = Marshaler::json().diagnostic(&decoded).unwrap();
        assert!(!rendered.contains("authToken"));
        assert!(!rendered.contains("refreshToken"));
        assert!(rendered.contains("\"installedAppId\":\"5f0a7a8e-app\""));
        assert!(!rendered.contains('\n'));
    }

    #[rstest]
    #[case("{not json")]
    #[case("[]")]
    #[case(r#"{"lifecycle": "REBOOT", "executionId": "e", "locale": "en", "version": "1"}"#)]
    #[case(r#"{"lifecycle": "INSTALL", "executionId": "e", "locale": "en", "version": "1"}"#)]
    fn decode_failures_are_uniform(#[case] text: &str) {
        let err = Marshaler::json().decode::<LifecycleRequest>(text).unwrap_err();
        assert!(matches!(err, MarshalError::Decode { format: WireFormat::Json, .. }));
    }

    #[test]
    fn unknown_phase_is_named() {
        let err = Marshaler::json()
            .decode::<LifecycleRequest>(r#"{"lifecycle": "REBOOT"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown lifecycle phase: REBOOT"));
    }

    #[test]
    fn decodes_yaml() {
        let yaml = "valueType: STRING\nstringConfig:\n  value: hello\n";
        let value: ConfigValue = Marshaler::yaml().decode(yaml).unwrap();
        assert!(Marshaler::json().encode(&value).unwrap().contains("hello"));
    }

    #[test]
    fn record_keys_follow_the_naming_rule() {
        let decoded: LifecycleRequest = Marshaler::json()
            .decode(&request("OAUTH_CALLBACK").to_string())
            .unwrap();
        let tree = serde_json::to_value(&decoded).unwrap();
        for field in ["execution_id", "locale", "version", "o_auth_callback_data"] {
            assert!(tree.get(to_wire_name(field)).is_some(), "{field}");
        }
        for field in ["installed_app_id", "url_path"] {
            assert!(tree["oAuthCallbackData"].get(to_wire_name(field)).is_some(), "{field}");
        }
    }
}
