//! Discriminator → variant tables for the three wire unions.
//!
//! Each union reads its discriminator from the raw object, looks it up here
//! and only then decodes the remaining fields against the concrete variant.
//! The tables are built once on first use and are read-only afterwards.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::objects::{
    BooleanSetting, ConfigSetting, ConfigValue, ConfigurationRequest, ConfirmationRequest,
    DecimalSetting, DeviceConfigValue, DeviceSetting, EmailSetting, EnumSetting, EventRequest,
    IconSetting, ImageSetting, InstallRequest, LifecycleRequest, LinkSetting, NumberSetting,
    OauthCallbackRequest, OauthSetting, PageSetting, ParagraphSetting, PhoneSetting,
    StringConfigValue, TextSetting, TimeSetting, UninstallRequest, UpdateRequest,
};

pub type Decoder<T> = fn(Value) -> Result<T, serde_json::Error>;

#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    #[error("missing {field} for {kind}")]
    MissingDiscriminator {
        kind: &'static str,
        field: &'static str,
    },
    #[error("unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },
    #[error("invalid {kind}: {source}")]
    Invalid {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One discriminated union: the name of its discriminator field and a decoder
/// per recognized value.
pub struct VariantTable<T> {
    kind: &'static str,
    field: &'static str,
    decoders: HashMap<&'static str, Decoder<T>>,
}

impl<T> VariantTable<T> {
    pub fn new(kind: &'static str, field: &'static str) -> Self {
        Self {
            kind,
            field,
            decoders: HashMap::new(),
        }
    }

    pub fn register(mut self, tag: &'static str, decoder: Decoder<T>) -> Self {
        self.decoders.insert(tag, decoder);
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Pick the variant named by the discriminator and decode the whole object
    /// as that variant. An unrecognized discriminator never falls back to a
    /// default variant.
    pub fn decode(&self, value: Value) -> Result<T, VariantError> {
        let tag = value
            .get(self.field)
            .and_then(Value::as_str)
            .ok_or(VariantError::MissingDiscriminator {
                kind: self.kind,
                field: self.field,
            })?;
        let decoder = *self
            .decoders
            .get(tag)
            .ok_or_else(|| VariantError::Unknown {
                kind: self.kind,
                value: tag.to_string(),
            })?;
        decoder(value).map_err(|source| VariantError::Invalid {
            kind: self.kind,
            source,
        })
    }
}

/// Serde entry point used by the unions' `Deserialize` impls.
pub(crate) fn deserialize_variant<'de, D, T>(
    table: &VariantTable<T>,
    deserializer: D,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    table.decode(value).map_err(serde::de::Error::custom)
}

lazy_static! {
    pub static ref REQUEST_BY_PHASE: VariantTable<LifecycleRequest> =
        VariantTable::new("lifecycle phase", "lifecycle")
            .register("CONFIRMATION", |v| {
                serde_json::from_value::<ConfirmationRequest>(v).map(LifecycleRequest::Confirmation)
            })
            .register("CONFIGURATION", |v| {
                serde_json::from_value::<ConfigurationRequest>(v)
                    .map(LifecycleRequest::Configuration)
            })
            .register("INSTALL", |v| {
                serde_json::from_value::<InstallRequest>(v).map(LifecycleRequest::Install)
            })
            .register("UPDATE", |v| {
                serde_json::from_value::<UpdateRequest>(v).map(LifecycleRequest::Update)
            })
            .register("UNINSTALL", |v| {
                serde_json::from_value::<UninstallRequest>(v).map(LifecycleRequest::Uninstall)
            })
            .register("OAUTH_CALLBACK", |v| {
                serde_json::from_value::<OauthCallbackRequest>(v)
                    .map(LifecycleRequest::OauthCallback)
            })
            .register("EVENT", |v| {
                serde_json::from_value::<EventRequest>(v).map(LifecycleRequest::Event)
            });
    pub static ref CONFIG_VALUE_BY_TYPE: VariantTable<ConfigValue> =
        VariantTable::new("config value type", "valueType")
            .register("DEVICE", |v| {
                serde_json::from_value::<DeviceConfigValue>(v).map(ConfigValue::Device)
            })
            .register("STRING", |v| {
                serde_json::from_value::<StringConfigValue>(v).map(ConfigValue::String)
            });
    pub static ref CONFIG_SETTING_BY_TYPE: VariantTable<ConfigSetting> =
        VariantTable::new("config setting type", "type")
            .register("DEVICE", |v| serde_json::from_value::<DeviceSetting>(v).map(ConfigSetting::Device))
            .register("TEXT", |v| serde_json::from_value::<TextSetting>(v).map(ConfigSetting::Text))
            .register("BOOLEAN", |v| serde_json::from_value::<BooleanSetting>(v).map(ConfigSetting::Boolean))
            .register("ENUM", |v| serde_json::from_value::<EnumSetting>(v).map(ConfigSetting::Enum))
            .register("LINK", |v| serde_json::from_value::<LinkSetting>(v).map(ConfigSetting::Link))
            .register("PAGE", |v| serde_json::from_value::<PageSetting>(v).map(ConfigSetting::Page))
            .register("IMAGE", |v| serde_json::from_value::<ImageSetting>(v).map(ConfigSetting::Image))
            .register("ICON", |v| serde_json::from_value::<IconSetting>(v).map(ConfigSetting::Icon))
            .register("TIME", |v| serde_json::from_value::<TimeSetting>(v).map(ConfigSetting::Time))
            .register("PARAGRAPH", |v| serde_json::from_value::<ParagraphSetting>(v).map(ConfigSetting::Paragraph))
            .register("EMAIL", |v| serde_json::from_value::<EmailSetting>(v).map(ConfigSetting::Email))
            .register("DECIMAL", |v| serde_json::from_value::<DecimalSetting>(v).map(ConfigSetting::Decimal))
            .register("NUMBER", |v| serde_json::from_value::<NumberSetting>(v).map(ConfigSetting::Number))
            .register("PHONE", |v| serde_json::from_value::<PhoneSetting>(v).map(ConfigSetting::Phone))
            .register("OAUTH", |v| serde_json::from_value::<OauthSetting>(v).map(ConfigSetting::Oauth));
}
