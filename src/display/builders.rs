//! Builder functions turning update requests into display states
//!
//! `reduce` is the whole controller logic as a pure function of the
//! current state, the request, the clock and the display timezone. No
//! transition is rejected based on the prior mode.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::countdown::{parse_target, Remaining};
use super::request::{GenericUpdate, MessageKind, MessageRequest, UpdateRequest};
use super::timezone::DisplayTimezone;
use super::types::{
    AlertContent, CelebrationContent, CountdownContent, DisplayContent, DisplayMode, DisplayState,
    MessageContent,
};

/// Title used by generic updates that omit one
pub const DEFAULT_UPDATE_TITLE: &str = "Home Display";

/// Title used by typed messages that omit one
pub const DEFAULT_MESSAGE_TITLE: &str = "Message";

/// Shown instead of a countdown whose target is already reached
pub const EVENT_PASSED: &str = "Event has passed!";

/// Shown instead of a countdown whose target is missing or unreadable
pub const INVALID_COUNTDOWN: &str = "Invalid countdown time";

const DEFAULT_FONT_SIZE: &str = "4rem";
const DEFAULT_SUB_SIZE: &str = "2rem";
const DEFAULT_CELEBRATION_TITLE: &str = "Celebration!";
const DEFAULT_CELEBRATION_ICON: &str = "🎉";
const DEFAULT_ALERT_TITLE: &str = "Alert";
const DEFAULT_COUNTDOWN_EVENT: &str = "Event";

/// Compute the state that follows `current` once `request` is applied
pub fn reduce(
    current: &DisplayState,
    request: UpdateRequest,
    now: DateTime<Utc>,
    tz: &DisplayTimezone,
) -> DisplayState {
    let stamp = tz.to_zone(now);
    match request {
        UpdateRequest::Generic(update) => build_generic_state(update, now, tz),
        UpdateRequest::Message(req) => build_message_state(&req, now, tz),
        UpdateRequest::Clear => DisplayState::quick_glance(stamp),
        UpdateRequest::Dashboard => DisplayState::dashboard(stamp),
        UpdateRequest::Refresh => DisplayState {
            updated: Some(stamp),
            ..current.clone()
        },
    }
}

/// Replace the display with producer-shaped content
pub fn build_generic_state(
    update: GenericUpdate,
    now: DateTime<Utc>,
    tz: &DisplayTimezone,
) -> DisplayState {
    DisplayState {
        mode: update
            .mode
            .map(DisplayMode::from)
            .unwrap_or(DisplayMode::Custom),
        title: update
            .title
            .unwrap_or_else(|| DEFAULT_UPDATE_TITLE.to_string()),
        content: DisplayContent::Free(update.content.unwrap_or_default()),
        updated: Some(tz.to_zone(now)),
    }
}

/// Resolve a typed message into its display mode and shaped content
pub fn build_message_state(
    req: &MessageRequest,
    now: DateTime<Utc>,
    tz: &DisplayTimezone,
) -> DisplayState {
    let kind = req.message_kind();

    let (mode, content) = match kind.target_mode() {
        DisplayMode::Countdown => match countdown_content(req, now, tz) {
            Ok(content) => (DisplayMode::Countdown, DisplayContent::Countdown(content)),
            Err(fallback) => (DisplayMode::Message, DisplayContent::Message(fallback)),
        },
        DisplayMode::Celebration => (
            DisplayMode::Celebration,
            DisplayContent::Celebration(celebration_content(req)),
        ),
        DisplayMode::Alert => (
            DisplayMode::Alert,
            DisplayContent::Alert(alert_content(req, &kind)),
        ),
        _ => (
            DisplayMode::Message,
            DisplayContent::Message(message_content(req, &kind)),
        ),
    };

    DisplayState {
        mode,
        title: req
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_MESSAGE_TITLE.to_string()),
        content,
        updated: Some(tz.to_zone(now)),
    }
}

/// Content of the plain message screen
pub fn message_content(req: &MessageRequest, kind: &MessageKind) -> MessageContent {
    MessageContent {
        message: req.message.clone().unwrap_or_default(),
        sub_message: req.sub_message.clone().unwrap_or_default(),
        font_size: req
            .font_size
            .clone()
            .unwrap_or_else(|| DEFAULT_FONT_SIZE.to_string()),
        sub_size: req
            .sub_size
            .clone()
            .unwrap_or_else(|| DEFAULT_SUB_SIZE.to_string()),
        auto_dismiss: req.auto_dismiss,
        kind: kind.as_str().to_string(),
        color: req
            .color
            .clone()
            .unwrap_or_else(|| kind.default_color().to_string()),
        sticky: req.sticky,
    }
}

/// Celebration screen: the message text names the celebrated, the
/// sub-message becomes the celebration message
pub fn celebration_content(req: &MessageRequest) -> CelebrationContent {
    CelebrationContent {
        title: req
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_CELEBRATION_TITLE.to_string()),
        name: req.message.clone().unwrap_or_default(),
        icon: req
            .icon
            .clone()
            .unwrap_or_else(|| DEFAULT_CELEBRATION_ICON.to_string()),
        message: req.sub_message.clone().unwrap_or_default(),
        kind: "celebration",
        auto_dismiss: req.auto_dismiss,
    }
}

pub fn alert_content(req: &MessageRequest, kind: &MessageKind) -> AlertContent {
    AlertContent {
        title: req
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_ALERT_TITLE.to_string()),
        message: req.message.clone().unwrap_or_default(),
        severity: kind.as_str().to_string(),
        details: req.details.clone().unwrap_or_default(),
        action: req.action.clone().unwrap_or_default(),
        kind: "alert",
        auto_dismiss: req.auto_dismiss,
    }
}

/// Live countdown content, or the message content to show instead
///
/// A reached target and a missing or unreadable target both fall back to
/// an `info` message so the screen keeps the message shape.
pub fn countdown_content(
    req: &MessageRequest,
    now: DateTime<Utc>,
    tz: &DisplayTimezone,
) -> Result<CountdownContent, MessageContent> {
    let target = match parse_target(req.countdown_to.as_deref(), tz) {
        Ok(target) => target,
        Err(e) => {
            warn!("Countdown parse error: {}", e);
            return Err(countdown_fallback(req, INVALID_COUNTDOWN));
        }
    };

    let Some(left) = Remaining::until(target, now) else {
        warn!("Countdown target {} already passed", target.to_rfc3339());
        return Err(countdown_fallback(req, EVENT_PASSED));
    };

    Ok(CountdownContent {
        days: left.display_days(),
        hours: left.hours,
        minutes: left.minutes,
        seconds: left.seconds,
        event: req
            .countdown_label
            .clone()
            .unwrap_or_else(|| DEFAULT_COUNTDOWN_EVENT.to_string()),
        message: req.message.clone().unwrap_or_default(),
        kind: "countdown",
        auto_dismiss: req.auto_dismiss,
    })
}

fn countdown_fallback(req: &MessageRequest, text: &str) -> MessageContent {
    let fallback = MessageRequest {
        message: Some(text.to_string()),
        ..req.clone()
    };
    message_content(&fallback, &MessageKind::Info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Map};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn message(value: serde_json::Value) -> MessageRequest {
        MessageRequest::from_body(Some(value)).unwrap()
    }

    fn content_of(state: &DisplayState) -> serde_json::Value {
        state.content.to_value()
    }

    #[test]
    fn test_generic_update_defaults() {
        let state = build_generic_state(GenericUpdate::default(), now(), &DisplayTimezone::Utc);
        assert_eq!(state.mode, DisplayMode::Custom);
        assert_eq!(state.title, DEFAULT_UPDATE_TITLE);
        assert_eq!(state.content, DisplayContent::Free(Map::new()));
        assert_eq!(state.updated, Some(now().fixed_offset()));
    }

    #[test]
    fn test_generic_update_keeps_unknown_mode() {
        let update = GenericUpdate {
            mode: Some("weather".into()),
            title: Some("Weather".into()),
            content: Some(json!({"temp": "21°"}).as_object().cloned().unwrap()),
        };
        let state = build_generic_state(update, now(), &DisplayTimezone::Utc);
        assert_eq!(state.mode, DisplayMode::Other("weather".into()));
        assert_eq!(content_of(&state), json!({"temp": "21°"}));
    }

    #[test]
    fn test_info_message_defaults() {
        let state = build_message_state(&message(json!({"message": "Dinner!"})), now(), &DisplayTimezone::Utc);
        assert_eq!(state.mode, DisplayMode::Message);
        assert_eq!(state.title, DEFAULT_MESSAGE_TITLE);
        assert_eq!(
            content_of(&state),
            json!({
                "message": "Dinner!",
                "sub_message": "",
                "font_size": "4rem",
                "sub_size": "2rem",
                "auto_dismiss": 0,
                "type": "info",
                "color": "#667eea",
                "sticky": false
            })
        );
    }

    #[test]
    fn test_warning_stays_message_mode() {
        let state = build_message_state(
            &message(json!({"type": "warning", "message": "Storm"})),
            now(),
            &DisplayTimezone::Utc,
        );
        assert_eq!(state.mode, DisplayMode::Message);
        let content = content_of(&state);
        assert_eq!(content["type"], json!("warning"));
        assert_eq!(content["color"], json!("#ffa502"));
    }

    #[test]
    fn test_explicit_color_wins() {
        let state = build_message_state(
            &message(json!({"type": "sticky", "color": "#123456", "sticky": true})),
            now(),
            &DisplayTimezone::Utc,
        );
        let content = content_of(&state);
        assert_eq!(content["color"], json!("#123456"));
        assert_eq!(content["sticky"], json!(true));
        assert_eq!(content["type"], json!("sticky"));
    }

    #[test]
    fn test_celebration_remaps_fields() {
        let state = build_message_state(
            &message(json!({"type": "celebration", "message": "Grandma", "sub_message": "Turns 80!"})),
            now(),
            &DisplayTimezone::Utc,
        );
        assert_eq!(state.mode, DisplayMode::Celebration);
        assert_eq!(
            content_of(&state),
            json!({
                "title": "Celebration!",
                "name": "Grandma",
                "icon": "🎉",
                "message": "Turns 80!",
                "type": "celebration",
                "auto_dismiss": 0
            })
        );
    }

    #[test]
    fn test_alert_content() {
        let state = build_message_state(
            &message(json!({
                "type": "alert",
                "title": "Weather Alert",
                "message": "Ice on roads",
                "details": ["Leave early"],
                "auto_dismiss": 30
            })),
            now(),
            &DisplayTimezone::Utc,
        );
        assert_eq!(state.mode, DisplayMode::Alert);
        assert_eq!(state.title, "Weather Alert");
        assert_eq!(
            content_of(&state),
            json!({
                "title": "Weather Alert",
                "message": "Ice on roads",
                "severity": "alert",
                "details": ["Leave early"],
                "action": "",
                "type": "alert",
                "auto_dismiss": 30
            })
        );
    }

    #[test]
    fn test_countdown_ninety_minutes() {
        let target = (now() + Duration::minutes(90)).to_rfc3339();
        let state = build_message_state(
            &message(json!({"type": "countdown", "countdown_to": target, "countdown_label": "Church"})),
            now(),
            &DisplayTimezone::Utc,
        );
        assert_eq!(state.mode, DisplayMode::Countdown);
        assert_eq!(
            content_of(&state),
            json!({
                "days": null,
                "hours": 1,
                "minutes": 30,
                "seconds": 0,
                "event": "Church",
                "message": "",
                "type": "countdown",
                "auto_dismiss": 0
            })
        );
    }

    #[test]
    fn test_countdown_naive_target_in_display_timezone() {
        let tz: DisplayTimezone = "+02:00".parse().unwrap();
        // 15:00 at +02:00 is 13:00 UTC, one hour after now()
        let state = build_message_state(
            &message(json!({"type": "countdown", "countdown_to": "2025-03-10T15:00:00"})),
            now(),
            &tz,
        );
        let content = content_of(&state);
        assert_eq!(state.mode, DisplayMode::Countdown);
        assert_eq!(content["hours"], json!(1));
        assert_eq!(content["minutes"], json!(0));
        assert_eq!(content["event"], json!("Event"));
        assert_eq!(state.updated.unwrap().to_rfc3339(), "2025-03-10T14:00:00+02:00");
    }

    #[test]
    fn test_countdown_in_past_downgrades() {
        let target = (now() - Duration::minutes(5)).to_rfc3339();
        let state = build_message_state(
            &message(json!({"type": "countdown", "countdown_to": target, "message": "Bus"})),
            now(),
            &DisplayTimezone::Utc,
        );
        assert_eq!(state.mode, DisplayMode::Message);
        let content = content_of(&state);
        assert_eq!(content["message"], json!(EVENT_PASSED));
        assert_eq!(content["type"], json!("info"));
    }

    #[test]
    fn test_countdown_unparseable_downgrades() {
        let state = build_message_state(
            &message(json!({"type": "countdown", "countdown_to": "someday"})),
            now(),
            &DisplayTimezone::Utc,
        );
        assert_eq!(state.mode, DisplayMode::Message);
        assert_eq!(content_of(&state)["message"], json!(INVALID_COUNTDOWN));
    }

    #[test]
    fn test_countdown_missing_target_downgrades() {
        let state = build_message_state(&message(json!({"type": "countdown"})), now(), &DisplayTimezone::Utc);
        assert_eq!(state.mode, DisplayMode::Message);
        assert_eq!(content_of(&state)["message"], json!(INVALID_COUNTDOWN));
    }

    #[test]
    fn test_reduce_clear_and_dashboard_ignore_prior_mode() {
        let prior = build_message_state(&message(json!({"type": "alert"})), now(), &DisplayTimezone::Utc);

        let cleared = reduce(&prior, UpdateRequest::Clear, now(), &DisplayTimezone::Utc);
        assert_eq!(cleared, DisplayState::quick_glance(now().fixed_offset()));

        let dash = reduce(&prior, UpdateRequest::Dashboard, now(), &DisplayTimezone::Utc);
        assert_eq!(dash.mode, DisplayMode::Dashboard);
        assert_eq!(dash.title, "Family Dashboard");
        assert_eq!(dash.content, DisplayContent::empty());
    }

    #[test]
    fn test_reduce_refresh_only_touches_timestamp() {
        let prior = build_message_state(&message(json!({"message": "Hi"})), now(), &DisplayTimezone::Utc);
        let later = now() + Duration::seconds(30);
        let refreshed = reduce(&prior, UpdateRequest::Refresh, later, &DisplayTimezone::Utc);
        assert_eq!(refreshed.mode, prior.mode);
        assert_eq!(refreshed.title, prior.title);
        assert_eq!(refreshed.content, prior.content);
        assert_eq!(refreshed.updated, Some(later.fixed_offset()));
    }
}
