//! Typed access to the configuration map shared by several payloads.

use super::event::EventData;
use super::lifecycle::{
    ConfigRequestData, EventRequest, InstallData, InstallRequest, UninstallData,
    UninstallRequest, UpdateData, UpdateRequest,
};
use super::value::{ConfigMap, ConfigValue, ConfigValueType, DeviceValue, InstalledApp};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValueError {
    #[error("Missing config value: {0}")]
    Missing(String),
    #[error("Config value {key} is not a {expected} value")]
    WrongType {
        key: String,
        expected: ConfigValueType,
    },
    #[error("Config value {key} is not a valid {target}: {value}")]
    Parse {
        key: String,
        target: &'static str,
        value: String,
    },
}

/// Accessors over a [`ConfigMap`]. Implementors only point at their map.
pub trait ConfigAccess {
    fn config(&self) -> &ConfigMap;

    fn values(&self, key: &str) -> Result<&[ConfigValue], ConfigValueError> {
        self.config()
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| ConfigValueError::Missing(key.to_string()))
    }

    fn as_devices(&self, key: &str) -> Result<Vec<&DeviceValue>, ConfigValueError> {
        self.values(key)?
            .iter()
            .map(|value| match value {
                ConfigValue::Device(device) => Ok(&device.device_config),
                ConfigValue::String(_) => Err(ConfigValueError::WrongType {
                    key: key.to_string(),
                    expected: ConfigValueType::Device,
                }),
            })
            .collect()
    }

    /// The first value under `key`, which must be a string value.
    fn as_str(&self, key: &str) -> Result<&str, ConfigValueError> {
        match self.values(key)?.first() {
            Some(ConfigValue::String(string)) => Ok(&string.string_config.value),
            Some(ConfigValue::Device(_)) => Err(ConfigValueError::WrongType {
                key: key.to_string(),
                expected: ConfigValueType::String,
            }),
            None => Err(ConfigValueError::Missing(key.to_string())),
        }
    }

    fn as_bool(&self, key: &str) -> Result<bool, ConfigValueError> {
        match self.as_str(key)? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(parse_error(key, "boolean", other)),
        }
    }

    fn as_int(&self, key: &str) -> Result<i64, ConfigValueError> {
        let raw = self.as_str(key)?;
        raw.trim()
            .parse()
            .map_err(|_| parse_error(key, "integer", raw))
    }

    fn as_float(&self, key: &str) -> Result<f64, ConfigValueError> {
        let raw = self.as_str(key)?;
        raw.trim().parse().map_err(|_| parse_error(key, "float", raw))
    }
}

fn parse_error(key: &str, target: &'static str, value: &str) -> ConfigValueError {
    ConfigValueError::Parse {
        key: key.to_string(),
        target,
        value: value.to_string(),
    }
}

/// Payloads that belong to one installed application.
pub trait AppScoped {
    fn installed_app(&self) -> &InstalledApp;

    fn app_id(&self) -> &str {
        &self.installed_app().installed_app_id
    }

    fn location_id(&self) -> &str {
        &self.installed_app().location_id
    }
}

impl ConfigAccess for InstalledApp {
    fn config(&self) -> &ConfigMap {
        &self.config
    }
}

impl ConfigAccess for ConfigRequestData {
    fn config(&self) -> &ConfigMap {
        &self.config
    }
}

macro_rules! scoped_payload {
    ($($ty:ty => |$s:ident| $app:expr;)*) => {
        $(
            impl AppScoped for $ty {
                fn installed_app(&self) -> &InstalledApp {
                    let $s = self;
                    $app
                }
            }
        )*
    };
}

scoped_payload! {
    InstallData => |s| &s.installed_app;
    UpdateData => |s| &s.installed_app;
    UninstallData => |s| &s.installed_app;
    EventData => |s| &s.installed_app;
    InstallRequest => |s| &s.install_data.installed_app;
    UpdateRequest => |s| &s.update_data.installed_app;
    UninstallRequest => |s| &s.uninstall_data.installed_app;
    EventRequest => |s| &s.event_data.installed_app;
}

macro_rules! config_from_app {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConfigAccess for $ty {
                fn config(&self) -> &ConfigMap {
                    &self.installed_app().config
                }
            }
        )*
    };
}

config_from_app!(
    InstallData,
    UpdateData,
    EventData,
    InstallRequest,
    UpdateRequest,
    EventRequest,
);

impl InstallData {
    pub fn token(&self) -> &str {
        &self.auth_token
    }
}

impl UpdateData {
    pub fn token(&self) -> &str {
        &self.auth_token
    }
}

impl InstallRequest {
    pub fn token(&self) -> &str {
        self.install_data.token()
    }
}

impl UpdateRequest {
    pub fn token(&self) -> &str {
        self.update_data.token()
    }
}

impl EventRequest {
    pub fn token(&self) -> &str {
        self.event_data.token()
    }
}
