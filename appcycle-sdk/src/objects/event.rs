//! Event deliveries (the EVENT lifecycle phase).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::value::InstalledApp;

/// Free-form event payload. The platform's per-event vocabulary is not modelled.
pub type EventPayload = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    DeviceCommandsEvent,
    DeviceEvent,
    DeviceHealthEvent,
    DeviceLifecycleEvent,
    HubHealthEvent,
    InstalledAppLifecycleEvent,
    ModeEvent,
    SceneLifecycleEvent,
    SecurityArmStateEvent,
    TimerEvent,
    WeatherEvent,
}

impl EventType {
    pub const ALL: [Self; 11] = [
        Self::DeviceCommandsEvent,
        Self::DeviceEvent,
        Self::DeviceHealthEvent,
        Self::DeviceLifecycleEvent,
        Self::HubHealthEvent,
        Self::InstalledAppLifecycleEvent,
        Self::ModeEvent,
        Self::SceneLifecycleEvent,
        Self::SecurityArmStateEvent,
        Self::TimerEvent,
        Self::WeatherEvent,
    ];
}

/// A single event. Exactly one of the per-type payloads is normally populated,
/// matching `event_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_time: Option<OffsetDateTime>,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_lifecycle_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_health_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_commands_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_lifecycle_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_arm_state_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_health_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_app_lifecycle_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_event: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<EventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality_data: Option<EventPayload>,
}

impl Event {
    /// The payload slot that belongs to `event_type`, if populated.
    pub fn for_type(&self, event_type: EventType) -> Option<&EventPayload> {
        match event_type {
            EventType::DeviceCommandsEvent => self.device_commands_event.as_ref(),
            EventType::DeviceEvent => self.device_event.as_ref(),
            EventType::DeviceHealthEvent => self.device_health_event.as_ref(),
            EventType::DeviceLifecycleEvent => self.device_lifecycle_event.as_ref(),
            EventType::HubHealthEvent => self.hub_health_event.as_ref(),
            EventType::InstalledAppLifecycleEvent => self.installed_app_lifecycle_event.as_ref(),
            EventType::ModeEvent => self.mode_event.as_ref(),
            EventType::SceneLifecycleEvent => self.scene_lifecycle_event.as_ref(),
            EventType::SecurityArmStateEvent => self.security_arm_state_event.as_ref(),
            EventType::TimerEvent => self.timer_event.as_ref(),
            EventType::WeatherEvent => self.weather_event.as_ref(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub auth_token: String,
    pub installed_app: InstalledApp,
    pub events: Vec<Event>,
}

impl EventData {
    pub fn token(&self) -> &str {
        &self.auth_token
    }

    /// Payloads of every event of `event_type`, in delivery order.
    pub fn for_type(&self, event_type: EventType) -> Vec<&EventPayload> {
        self.events
            .iter()
            .filter(|event| event.event_type == event_type)
            .filter_map(|event| event.for_type(event_type))
            .collect()
    }

    pub fn filter<F>(&self, event_type: EventType, predicate: F) -> Vec<&EventPayload>
    where
        F: Fn(&EventPayload) -> bool,
    {
        self.for_type(event_type)
            .into_iter()
            .filter(|payload| predicate(payload))
            .collect()
    }
}

impl std::fmt::Debug for EventData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventData")
            .field("installed_app", &self.installed_app)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
