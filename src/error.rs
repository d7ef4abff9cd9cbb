//! Error types for the display receiver

/// Errors surfaced to callers of the controller and its stores
///
/// Semantically invalid requests (expired or unparseable countdowns) are
/// never reported here; the controller degrades them to fallback content.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Request body absent, empty or not shaped as the operation expects
    #[error("{0}")]
    InvalidRequest(String),

    /// Template identifier does not reduce to a usable file name
    #[error("Invalid template name: '{0}'")]
    InvalidTemplateName(String),

    /// Reading or writing a template or preferences file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preferences could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ControllerError {
    /// Whether the caller sent something the receiver cannot accept
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ControllerError::InvalidRequest(_) | ControllerError::InvalidTemplateName(_)
        )
    }
}
