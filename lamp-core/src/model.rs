use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Literal returned in place of a decision when the service answers with a
/// non-success status.
pub const ERROR_SENTINEL: &str = "ERROR";

/// Ambient conditions fed to the lamp service. Values are sent as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub humidity: f64,
    pub cloudcover: f64,
    pub visibility: f64,
    pub uvindex: f64,
    pub day_of_year: i64,
    pub temp: f64,
    pub precip: f64,
}

/// Day of year (1-366) of a calendar date, in the form the service expects.
pub fn day_of_year(date: impl Datelike) -> i64 {
    i64::from(date.ordinal())
}

/// Body of `POST /api/control_lamp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LampDecisionRequest {
    pub is_night_time: bool,
    pub is_motion_detected: bool,
    pub weather_data: WeatherObservation,
}

impl LampDecisionRequest {
    pub fn new(
        is_night_time: bool,
        is_motion_detected: bool,
        weather_data: WeatherObservation,
    ) -> Self {
        Self { is_night_time, is_motion_detected, weather_data }
    }
}

/// Self-diagnosis block some service versions attach to a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub current_temp_c: f64,
    pub max_safe_temp_c: f64,
    pub is_overheated: bool,
}

/// Success body of the lamp service. Only `lamp_action` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampControlReply {
    pub lamp_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_health: Option<SystemHealth>,
}

/// What a caller gets back: the service's label, or the `"ERROR"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LampDecision {
    Action(String),
    Error,
}

impl LampDecision {
    pub fn as_str(&self) -> &str {
        match self {
            LampDecision::Action(label) => label,
            LampDecision::Error => ERROR_SENTINEL,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LampDecision::Error)
    }

    /// Coarse output level; `None` for the sentinel.
    pub fn level(&self) -> Option<LampLevel> {
        match self {
            LampDecision::Action(label) => Some(LampLevel::from_label(label)),
            LampDecision::Error => None,
        }
    }
}

impl std::fmt::Display for LampDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LampDecision> for String {
    fn from(decision: LampDecision) -> Self {
        match decision {
            LampDecision::Action(label) => label,
            LampDecision::Error => ERROR_SENTINEL.to_string(),
        }
    }
}

/// Output level read from a decision label such as `"DIMMER OUTPUT (Motion Detected)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LampLevel {
    Off,
    Dimmer,
    Max,
    Unknown,
}

impl LampLevel {
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().replace('_', " ").to_uppercase();

        if normalized.starts_with("OFF") {
            LampLevel::Off
        } else if normalized.starts_with("DIMMER") {
            LampLevel::Dimmer
        } else if normalized.starts_with("MAX") {
            LampLevel::Max
        } else {
            LampLevel::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LampLevel::Off => "off",
            LampLevel::Dimmer => "dimmer",
            LampLevel::Max => "max",
            LampLevel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LampLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
