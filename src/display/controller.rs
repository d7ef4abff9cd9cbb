//! DisplayController - owner of the single display record
//!
//! Request handlers share one controller through an `Arc`. Every mutation
//! computes the next record with [`reduce`] and swaps it in under the write
//! lock, so readers never observe a half-applied update. Concurrent writers
//! are last-write-wins in lock acquisition order.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use super::builders::reduce;
use super::request::{GenericUpdate, MessageRequest, UpdateRequest};
use super::timezone::DisplayTimezone;
use super::types::DisplayState;

/// Handle to the current display state
#[derive(Debug, Default)]
pub struct DisplayController {
    state: RwLock<DisplayState>,
    /// Kept apart from the state so a config reload never blocks readers
    timezone: RwLock<DisplayTimezone>,
}

impl DisplayController {
    /// Create a controller holding the start-up state
    pub fn new(timezone: DisplayTimezone) -> Self {
        Self {
            state: RwLock::new(DisplayState::default()),
            timezone: RwLock::new(timezone),
        }
    }

    pub fn timezone(&self) -> DisplayTimezone {
        *self.timezone.read()
    }

    /// Switch the display timezone (takes effect on the next update)
    pub fn set_timezone(&self, timezone: DisplayTimezone) {
        let mut current = self.timezone.write();
        if *current != timezone {
            info!("Display timezone changed: {} -> {}", *current, timezone);
            *current = timezone;
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> DisplayState {
        self.state.read().clone()
    }

    /// Apply any update request using the wall clock
    pub fn apply(&self, request: UpdateRequest) -> DisplayState {
        self.apply_at(request, Utc::now())
    }

    /// Apply an update request as of `now`
    pub fn apply_at(&self, request: UpdateRequest, now: DateTime<Utc>) -> DisplayState {
        let tz = self.timezone();

        if let UpdateRequest::Message(req) = &request {
            info!(
                "Message sent: type={}, sticky={}, auto_dismiss={}",
                req.message_kind(),
                req.sticky,
                req.auto_dismiss
            );
        }

        let mut state = self.state.write();
        let next = reduce(&state, request, now, &tz);
        *state = next.clone();
        drop(state);

        info!("Display updated: {} - {}", next.mode, next.title);
        debug!("Display content: {}", next.content.to_value());
        next
    }

    pub fn apply_generic_update(&self, update: GenericUpdate) -> DisplayState {
        self.apply(UpdateRequest::Generic(update))
    }

    pub fn apply_message(&self, request: MessageRequest) -> DisplayState {
        self.apply(UpdateRequest::Message(request))
    }

    /// Back to the full family dashboard
    pub fn reset_to_dashboard(&self) -> DisplayState {
        self.apply(UpdateRequest::Dashboard)
    }

    /// Back to the ambient glance view
    pub fn clear_message(&self) -> DisplayState {
        self.apply(UpdateRequest::Clear)
    }

    /// Keep the current screen, bump `updated`
    pub fn refresh(&self) -> DisplayState {
        self.apply(UpdateRequest::Refresh)
    }
}
