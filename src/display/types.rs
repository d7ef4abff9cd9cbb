//! Display state type definitions
//!
//! Defines the canonical display record, the display modes and the
//! per-mode content schemas served to the rendering front end.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Title shown when the display falls back to the glance view
pub const QUICK_GLANCE_TITLE: &str = "Quick Look";

/// Title shown on the full dashboard
pub const DASHBOARD_TITLE: &str = "Family Dashboard";

/// Screen the rendering front end should show
///
/// Unknown mode names pushed through a generic update are kept verbatim
/// in [`DisplayMode::Other`]; rendering them is the front end's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisplayMode {
    Dashboard,
    QuickGlance,
    Run,
    Meals,
    Routine,
    Custom,
    Message,
    Celebration,
    Countdown,
    Alert,
    Other(String),
}

impl DisplayMode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &str {
        match self {
            DisplayMode::Dashboard => "dashboard",
            DisplayMode::QuickGlance => "quickglance",
            DisplayMode::Run => "run",
            DisplayMode::Meals => "meals",
            DisplayMode::Routine => "routine",
            DisplayMode::Custom => "custom",
            DisplayMode::Message => "message",
            DisplayMode::Celebration => "celebration",
            DisplayMode::Countdown => "countdown",
            DisplayMode::Alert => "alert",
            DisplayMode::Other(name) => name,
        }
    }
}

impl From<&str> for DisplayMode {
    fn from(name: &str) -> Self {
        match name {
            "dashboard" => DisplayMode::Dashboard,
            "quickglance" => DisplayMode::QuickGlance,
            "run" => DisplayMode::Run,
            "meals" => DisplayMode::Meals,
            "routine" => DisplayMode::Routine,
            "custom" => DisplayMode::Custom,
            "message" => DisplayMode::Message,
            "celebration" => DisplayMode::Celebration,
            "countdown" => DisplayMode::Countdown,
            "alert" => DisplayMode::Alert,
            other => DisplayMode::Other(other.to_string()),
        }
    }
}

impl From<String> for DisplayMode {
    fn from(name: String) -> Self {
        DisplayMode::from(name.as_str())
    }
}

impl From<DisplayMode> for String {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a `message` screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageContent {
    pub message: String,
    pub sub_message: String,
    pub font_size: String,
    pub sub_size: String,
    pub auto_dismiss: u64,
    /// Semantic message type as requested (e.g. "warning"), not the mode
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub sticky: bool,
}

/// Content of a `countdown` screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountdownContent {
    /// Whole days left, `None` when less than a day remains
    pub days: Option<i64>,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub event: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub auto_dismiss: u64,
}

/// Content of a `celebration` screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelebrationContent {
    pub title: String,
    /// Who or what is celebrated
    pub name: String,
    pub icon: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub auto_dismiss: u64,
}

/// Content of an `alert` screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertContent {
    pub title: String,
    pub message: String,
    pub severity: String,
    pub details: Vec<Value>,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub auto_dismiss: u64,
}

/// Mode-shaped display payload
///
/// Serializes as a flat JSON object. Producer-shaped modes (dashboard,
/// quickglance, run, meals, routine, custom and unknown modes) carry a
/// free-form mapping; the modes built by the controller carry their own
/// schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayContent {
    Message(MessageContent),
    Countdown(CountdownContent),
    Celebration(CelebrationContent),
    Alert(AlertContent),
    Free(Map<String, Value>),
}

impl DisplayContent {
    /// Empty free-form content
    pub fn empty() -> Self {
        DisplayContent::Free(Map::new())
    }

    /// Render the content as a JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

impl Default for DisplayContent {
    fn default() -> Self {
        Self::empty()
    }
}

/// The single display record served to the front end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub mode: DisplayMode,
    pub title: String,
    pub content: DisplayContent,
    /// Time of last mutation, `None` until the first update
    pub updated: Option<DateTime<FixedOffset>>,
}

impl DisplayState {
    /// Full family dashboard
    pub fn dashboard(now: DateTime<FixedOffset>) -> Self {
        Self {
            mode: DisplayMode::Dashboard,
            title: DASHBOARD_TITLE.to_string(),
            content: DisplayContent::empty(),
            updated: Some(now),
        }
    }

    /// Ambient glance view
    pub fn quick_glance(now: DateTime<FixedOffset>) -> Self {
        Self {
            mode: DisplayMode::QuickGlance,
            title: QUICK_GLANCE_TITLE.to_string(),
            content: DisplayContent::empty(),
            updated: Some(now),
        }
    }
}

impl Default for DisplayState {
    /// State at process start: glance view, never updated
    fn default() -> Self {
        Self {
            mode: DisplayMode::QuickGlance,
            title: QUICK_GLANCE_TITLE.to_string(),
            content: DisplayContent::empty(),
            updated: None,
        }
    }
}
