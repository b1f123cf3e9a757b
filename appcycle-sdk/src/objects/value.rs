//! Configuration values attached to an installed application.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::registry::{CONFIG_VALUE_BY_TYPE, deserialize_variant};

/// Named configuration values, as selected by the user during configuration.
pub type ConfigMap = BTreeMap<String, Vec<ConfigValue>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigValueType {
    Device,
    String,
}

impl ConfigValueType {
    pub const ALL: [Self; 2] = [Self::Device, Self::String];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigValueType::Device => "DEVICE",
            ConfigValueType::String => "STRING",
        }
    }
}

impl std::fmt::Display for ConfigValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceValue {
    pub device_id: String,
    pub component_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfigValue {
    pub device_config: DeviceValue,
    pub value_type: ConfigValueType,
}

impl DeviceConfigValue {
    pub fn new(device_id: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self {
            device_config: DeviceValue {
                device_id: device_id.into(),
                component_id: component_id.into(),
            },
            value_type: ConfigValueType::Device,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConfigValue {
    pub string_config: StringValue,
    pub value_type: ConfigValueType,
}

impl StringConfigValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            string_config: StringValue {
                value: value.into(),
            },
            value_type: ConfigValueType::String,
        }
    }
}

/// A single configuration value, selected by `valueType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Device(DeviceConfigValue),
    String(StringConfigValue),
}

impl ConfigValue {
    pub fn value_type(&self) -> ConfigValueType {
        match self {
            ConfigValue::Device(v) => v.value_type,
            ConfigValue::String(v) => v.value_type,
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_variant(&CONFIG_VALUE_BY_TYPE, deserializer)
    }
}

/// The installed instance of an application at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub installed_app_id: String,
    pub location_id: String,
    pub config: ConfigMap,
    #[serde(default)]
    pub permissions: Vec<String>,
}
