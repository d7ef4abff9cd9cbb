//! Template asset storage for the rendering front end
//!
//! Template bodies are opaque to the receiver. Only the identifier is
//! checked: it is reduced to a bare file name and given an `.html`
//! extension so writes stay inside the templates directory.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::ControllerError;

/// Extension every stored template carries
pub const TEMPLATE_EXTENSION: &str = ".html";

/// Page served as the display's main view
pub const DISPLAY_TEMPLATE: &str = "display.html";

/// Preferences editor page
pub const CONFIG_TEMPLATE: &str = "config.html";

/// Directory of rendering templates
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the main display page
    pub fn display_page(&self) -> PathBuf {
        self.dir.join(DISPLAY_TEMPLATE)
    }

    /// Path of the preferences editor page
    pub fn config_page(&self) -> PathBuf {
        self.dir.join(CONFIG_TEMPLATE)
    }

    /// Store `content` under the sanitized `name`, returning the file name used
    pub async fn write(&self, name: &str, content: &str) -> Result<String, ControllerError> {
        let file_name = sanitize_name(name)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.dir.join(&file_name), content).await?;
        info!("Template updated: {} ({} bytes)", file_name, content.len());
        Ok(file_name)
    }

    /// Read a stored template back
    pub async fn read(&self, name: &str) -> Result<String, ControllerError> {
        let file_name = sanitize_name(name)?;
        Ok(fs::read_to_string(self.dir.join(file_name)).await?)
    }
}

/// Reduce a template identifier to a safe file name ending in `.html`
///
/// Any directory part (either separator style) is dropped; names that end
/// up empty, `.` or `..` are rejected.
pub fn sanitize_name(raw: &str) -> Result<String, ControllerError> {
    let base = raw
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return Err(ControllerError::InvalidTemplateName(raw.to_string()));
    }

    if base.ends_with(TEMPLATE_EXTENSION) {
        Ok(base.to_string())
    } else {
        Ok(format!("{}{}", base, TEMPLATE_EXTENSION))
    }
}
