//! Update requests accepted by the display controller
//!
//! Requests are transient: each one is reduced into a new `DisplayState`
//! and dropped.

use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::types::DisplayMode;
use crate::error::ControllerError;

/// Error text returned when an update carries no data
pub const NO_DATA: &str = "No data provided";

/// Replace the display wholesale with producer-shaped content
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenericUpdate {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Map<String, Value>>,
}

impl GenericUpdate {
    /// Interpret a parsed request body
    ///
    /// An absent body, `null` or an empty object carries no data and is
    /// rejected, as is a `content` that is not an object.
    pub fn from_body(body: Option<Value>) -> Result<Self, ControllerError> {
        match body {
            None | Some(Value::Null) => Err(ControllerError::InvalidRequest(NO_DATA.into())),
            Some(Value::Object(map)) if map.is_empty() => {
                Err(ControllerError::InvalidRequest(NO_DATA.into()))
            }
            Some(value @ Value::Object(_)) => serde_json::from_value(value)
                .map_err(|e| ControllerError::InvalidRequest(format!("Invalid update: {}", e))),
            Some(_) => Err(ControllerError::InvalidRequest(
                "Update body must be a JSON object".into(),
            )),
        }
    }
}

/// Semantic type of a typed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Alert,
    Celebration,
    Countdown,
    Sticky,
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Warning => "warning",
            MessageKind::Alert => "alert",
            MessageKind::Celebration => "celebration",
            MessageKind::Countdown => "countdown",
            MessageKind::Sticky => "sticky",
            MessageKind::Other(name) => name,
        }
    }

    /// Display mode a message of this type is shown in
    ///
    /// Warnings use the message screen with warning styling; anything
    /// unrecognized is a plain message.
    pub fn target_mode(&self) -> DisplayMode {
        match self {
            MessageKind::Celebration => DisplayMode::Celebration,
            MessageKind::Countdown => DisplayMode::Countdown,
            MessageKind::Alert => DisplayMode::Alert,
            _ => DisplayMode::Message,
        }
    }

    /// Accent color used when the request does not pick one
    pub fn default_color(&self) -> &'static str {
        match self {
            MessageKind::Warning => "#ffa502",
            MessageKind::Alert => "#ff4757",
            MessageKind::Celebration => "#f093fb",
            MessageKind::Sticky => "#2ed573",
            _ => "#667eea",
        }
    }
}

impl From<&str> for MessageKind {
    fn from(name: &str) -> Self {
        match name {
            "info" => MessageKind::Info,
            "warning" => MessageKind::Warning,
            "alert" => MessageKind::Alert,
            "celebration" => MessageKind::Celebration,
            "countdown" => MessageKind::Countdown,
            "sticky" => MessageKind::Sticky,
            other => MessageKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fullscreen typed message (info, warning, alert, celebration, countdown, sticky)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessageRequest {
    pub message: Option<String>,
    pub sub_message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub font_size: Option<String>,
    pub sub_size: Option<String>,
    /// Seconds until the front end returns to the glance view (0 = never)
    #[serde(deserialize_with = "lenient_seconds")]
    pub auto_dismiss: u64,
    #[serde(deserialize_with = "null_as_false")]
    pub sticky: bool,
    pub color: Option<String>,
    /// Absolute target time for countdowns (ISO 8601)
    ///
    /// Non-string values are kept as their JSON text so they fail target
    /// parsing instead of rejecting the whole message.
    #[serde(deserialize_with = "lenient_text")]
    pub countdown_to: Option<String>,
    pub countdown_label: Option<String>,
    pub details: Option<Vec<Value>>,
    pub action: Option<String>,
    pub icon: Option<String>,
    pub title: Option<String>,
}

impl MessageRequest {
    /// Interpret a parsed request body; an absent body means all defaults
    pub fn from_body(body: Option<Value>) -> Result<Self, ControllerError> {
        match body {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ControllerError::InvalidRequest(format!("Invalid message: {}", e))),
        }
    }

    /// Resolved semantic type, `info` when unset
    pub fn message_kind(&self) -> MessageKind {
        self.kind
            .as_deref()
            .map(MessageKind::from)
            .unwrap_or(MessageKind::Info)
    }
}

/// Accept seconds as an integer, a float or a numeric string; negative
/// values mean no auto-dismiss
fn lenient_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Signed(i64),
        Float(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None | Some(Raw::Signed(_)) => Ok(0),
        Some(Raw::Int(n)) => Ok(n),
        Some(Raw::Float(f)) if f.is_finite() => Ok(f.max(0.0).trunc() as u64),
        Some(Raw::Float(f)) => Err(de::Error::custom(format!("invalid seconds value {}", f))),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(|n| n.max(0) as u64)
            .map_err(|_| de::Error::custom(format!("invalid seconds value '{}'", s))),
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Strings pass through, `null` is absent, anything else becomes its JSON text
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// Every request shape the controller reduces
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateRequest {
    Generic(GenericUpdate),
    Message(MessageRequest),
    /// Return to the glance view
    Clear,
    /// Return to the full dashboard
    Dashboard,
    /// Keep the display as is, bump the timestamp
    Refresh,
}
