//! Configuration settings: the UI elements offered on a configuration page.

use serde::{Deserialize, Deserializer, Serialize};

use crate::registry::{CONFIG_SETTING_BY_TYPE, deserialize_variant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigSettingType {
    Device,
    Text,
    Boolean,
    Enum,
    Link,
    Page,
    Image,
    Icon,
    Time,
    Paragraph,
    Email,
    Decimal,
    Number,
    Phone,
    Oauth,
}

impl ConfigSettingType {
    pub const ALL: [Self; 15] = [
        Self::Device,
        Self::Text,
        Self::Boolean,
        Self::Enum,
        Self::Link,
        Self::Page,
        Self::Image,
        Self::Icon,
        Self::Time,
        Self::Paragraph,
        Self::Email,
        Self::Decimal,
        Self::Number,
        Self::Phone,
        Self::Oauth,
    ];
}

/// Boolean default values travel as the strings `"true"` and `"false"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanValue {
    True,
    False,
}

impl From<bool> for BooleanValue {
    fn from(value: bool) -> Self {
        if value {
            BooleanValue::True
        } else {
            BooleanValue::False
        }
    }
}

impl From<BooleanValue> for bool {
    fn from(value: BooleanValue) -> Self {
        value == BooleanValue::True
    }
}

/// Fields shared by every setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingHeader {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl SettingHeader {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            required: None,
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// Select one or more devices. Devices must have every listed capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub multiple: bool,
    pub capabilities: Vec<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub default_value: BooleanValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumOptionGroup {
    pub name: String,
    pub options: Vec<EnumOption>,
}

/// Pick from a flat or a grouped option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnumOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped_options: Option<Vec<EnumOptionGroup>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub url: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub page: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
    pub browser: bool,
    pub url_template: String,
}

/// Settings that carry nothing beyond the common header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainSetting {
    #[serde(flatten)]
    pub header: SettingHeader,
    #[serde(rename = "type")]
    pub setting_type: ConfigSettingType,
}

pub type TimeSetting = PlainSetting;
pub type EmailSetting = PlainSetting;
pub type DecimalSetting = PlainSetting;
pub type NumberSetting = PlainSetting;
pub type PhoneSetting = PlainSetting;

/// A configuration setting, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigSetting {
    Device(DeviceSetting),
    Text(TextSetting),
    Boolean(BooleanSetting),
    Enum(EnumSetting),
    Link(LinkSetting),
    Page(PageSetting),
    Image(ImageSetting),
    Icon(IconSetting),
    Time(TimeSetting),
    Paragraph(ParagraphSetting),
    Email(EmailSetting),
    Decimal(DecimalSetting),
    Number(NumberSetting),
    Phone(PhoneSetting),
    Oauth(OauthSetting),
}

impl ConfigSetting {
    pub fn header(&self) -> &SettingHeader {
        match self {
            ConfigSetting::Device(s) => &s.header,
            ConfigSetting::Text(s) => &s.header,
            ConfigSetting::Boolean(s) => &s.header,
            ConfigSetting::Enum(s) => &s.header,
            ConfigSetting::Link(s) => &s.header,
            ConfigSetting::Page(s) => &s.header,
            ConfigSetting::Image(s) => &s.header,
            ConfigSetting::Icon(s) => &s.header,
            ConfigSetting::Paragraph(s) => &s.header,
            ConfigSetting::Oauth(s) => &s.header,
            ConfigSetting::Time(s)
            | ConfigSetting::Email(s)
            | ConfigSetting::Decimal(s)
            | ConfigSetting::Number(s)
            | ConfigSetting::Phone(s) => &s.header,
        }
    }

    pub fn setting_type(&self) -> ConfigSettingType {
        match self {
            ConfigSetting::Device(s) => s.setting_type,
            ConfigSetting::Text(s) => s.setting_type,
            ConfigSetting::Boolean(s) => s.setting_type,
            ConfigSetting::Enum(s) => s.setting_type,
            ConfigSetting::Link(s) => s.setting_type,
            ConfigSetting::Page(s) => s.setting_type,
            ConfigSetting::Image(s) => s.setting_type,
            ConfigSetting::Icon(s) => s.setting_type,
            ConfigSetting::Paragraph(s) => s.setting_type,
            ConfigSetting::Oauth(s) => s.setting_type,
            ConfigSetting::Time(s)
            | ConfigSetting::Email(s)
            | ConfigSetting::Decimal(s)
            | ConfigSetting::Number(s)
            | ConfigSetting::Phone(s) => s.setting_type,
        }
    }

    pub fn id(&self) -> &str {
        &self.header().id
    }
}

impl<'de> Deserialize<'de> for ConfigSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_variant(&CONFIG_SETTING_BY_TYPE, deserializer)
    }
}

/// A named group of settings on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSection {
    pub name: String,
    pub settings: Vec<ConfigSetting>,
}
