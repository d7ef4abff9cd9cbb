//! Display state controller
//!
//! Holds the one display record shown on the household screen, turns
//! producer requests (generic updates, typed messages, clear/reset) into
//! mode-shaped content and serves snapshots to the polling front end.

mod builders;
mod controller;
mod countdown;
mod request;
mod timezone;
mod types;

pub use builders::{reduce, EVENT_PASSED, INVALID_COUNTDOWN};
pub use controller::DisplayController;
pub use countdown::{parse_target, CountdownError, Remaining};
pub use request::{GenericUpdate, MessageKind, MessageRequest, UpdateRequest, NO_DATA};
pub use timezone::{DisplayTimezone, TimezoneParseError};
pub use types::{
    AlertContent, CelebrationContent, CountdownContent, DisplayContent, DisplayMode, DisplayState,
    MessageContent,
};
