//! Wire records exchanged with the platform.
//!
//! All records use `snake_case` fields in memory and `camelCase` on the wire
//! (see [`crate::naming`]). The three discriminated unions
//! ([`LifecycleRequest`], [`ConfigValue`], [`ConfigSetting`]) decode through the
//! tables in [`crate::registry`] and encode untagged, because each variant
//! already carries its own discriminator as an ordinary field.

mod access;
mod event;
mod lifecycle;
mod response;
mod setting;
mod value;

pub use access::{AppScoped, ConfigAccess, ConfigValueError};
pub use event::{Event, EventData, EventPayload, EventType};
pub use lifecycle::{
    ConfigPhase, ConfigRequestData, ConfigurationRequest, ConfirmationData, ConfirmationRequest,
    EventRequest, InstallData, InstallRequest, LifecyclePhase, LifecycleRequest,
    OauthCallbackData, OauthCallbackRequest, RequestHeader, Settings, UninstallData,
    UninstallRequest, UpdateData, UpdateRequest,
};
pub use response::{
    ConfigInit, ConfigInitData, ConfigPage, ConfigPageData, ConfigurationInitResponse,
    ConfigurationPageResponse, ConfirmationResponse, EmptyPayload, EventResponse,
    InstallResponse, LifecycleResponse, OauthCallbackResponse, UninstallResponse,
    UpdateResponse,
};
pub use setting::{
    BooleanSetting, BooleanValue, ConfigSection, ConfigSetting, ConfigSettingType,
    DecimalSetting, DeviceSetting, EmailSetting, EnumOption, EnumOptionGroup, EnumSetting,
    IconSetting, ImageSetting, LinkSetting, NumberSetting, OauthSetting, PageSetting,
    ParagraphSetting, PhoneSetting, PlainSetting, SettingHeader, TextSetting, TimeSetting,
};
pub use value::{
    ConfigMap, ConfigValue, ConfigValueType, DeviceConfigValue, DeviceValue, InstalledApp,
    StringConfigValue, StringValue,
};
