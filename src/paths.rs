//! Application path management for portable and installed modes.
//!
//! This module resolves where the receiver finds its configuration file
//! and keeps its data (templates, display preferences) and logs.
//!
//! ## Mode Detection
//!
//! - **Dev mode** (debug builds): a `config.yaml` in the current working
//!   directory makes that directory the base.
//! - **Portable mode**: a `.portable` marker file next to the executable
//!   keeps everything in the executable's directory.
//! - **Installed mode** (default): data lives in the platform data
//!   directory (`~/.local/share/Homeboard`, `%APPDATA%\Homeboard`, ...).

use std::path::{Path, PathBuf};
use tracing::debug;

/// Application name used for directories in installed mode
const APP_NAME: &str = "Homeboard";

/// File name of the configuration file
pub const CONFIG_FILE: &str = "config.yaml";

/// File name of the persisted display preferences
pub const PREFS_FILE: &str = "display-prefs.json";

/// Application paths for config, data, and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    /// Path to the configuration file
    pub config: PathBuf,
    /// Directory holding templates and display preferences
    pub data_dir: PathBuf,
    /// Path to the logs directory
    pub logs_dir: PathBuf,
    /// Whether everything lives in one self-contained directory
    pub is_portable: bool,
}

impl AppPaths {
    /// Detect the appropriate paths based on environment.
    ///
    /// Note: This is called before logging is initialized, so we use eprintln
    /// for early diagnostic output.
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let paths = Self::resolve(&exe_dir, &cwd, dirs::data_dir(), cfg!(debug_assertions));

        #[cfg(debug_assertions)]
        eprintln!(
            "[paths] config: {}, data: {} (portable: {})",
            paths.config.display(),
            paths.data_dir.display(),
            paths.is_portable
        );

        paths
    }

    /// Pure mode selection, separated from the environment lookups
    fn resolve(
        exe_dir: &Path,
        cwd: &Path,
        platform_data_dir: Option<PathBuf>,
        dev_build: bool,
    ) -> Self {
        if dev_build && cwd.join(CONFIG_FILE).exists() {
            return Self::self_contained(cwd);
        }

        // Explicit marker avoids portable mode in read-only install dirs
        if exe_dir.join(".portable").exists() {
            return Self::self_contained(exe_dir);
        }

        let app_data = platform_data_dir
            .unwrap_or_else(|| {
                eprintln!("[paths] WARNING: no platform data directory, falling back to exe dir");
                exe_dir.to_path_buf()
            })
            .join(APP_NAME);

        Self {
            config: app_data.join(CONFIG_FILE),
            data_dir: app_data.clone(),
            logs_dir: app_data.join("logs"),
            is_portable: false,
        }
    }

    /// Everything under one base directory
    pub fn self_contained(base: &Path) -> Self {
        Self {
            config: base.join(CONFIG_FILE),
            data_dir: base.join("data"),
            logs_dir: base.join("logs"),
            is_portable: true,
        }
    }

    /// Replace the config file location (CLI `--config`)
    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = config.into();
        self
    }

    /// Replace the data directory (CLI `--data-dir` or `storage.data_dir`)
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Directory of rendering templates
    pub fn templates_dir(&self) -> PathBuf {
        self.data_dir.join("templates")
    }

    /// Persisted display preferences
    pub fn prefs_file(&self) -> PathBuf {
        self.data_dir.join(PREFS_FILE)
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [self.data_dir.clone(), self.templates_dir(), self.logs_dir.clone()] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dev_mode_uses_cwd_config() {
        let cwd = TempDir::new().unwrap();
        let exe = TempDir::new().unwrap();
        std::fs::write(cwd.path().join(CONFIG_FILE), "").unwrap();

        let paths = AppPaths::resolve(exe.path(), cwd.path(), None, true);
        assert_eq!(paths, AppPaths::self_contained(cwd.path()));

        // Release builds ignore the cwd config
        let paths = AppPaths::resolve(exe.path(), cwd.path(), Some(PathBuf::from("/data")), false);
        assert!(!paths.is_portable);
    }

    #[test]
    fn test_portable_marker() {
        let cwd = TempDir::new().unwrap();
        let exe = TempDir::new().unwrap();
        std::fs::write(exe.path().join(".portable"), "").unwrap();

        let paths = AppPaths::resolve(exe.path(), cwd.path(), None, true);
        assert!(paths.is_portable);
        assert_eq!(paths.config, exe.path().join(CONFIG_FILE));
        assert_eq!(paths.templates_dir(), exe.path().join("data").join("templates"));
    }

    #[test]
    fn test_installed_mode_uses_platform_dir() {
        let cwd = TempDir::new().unwrap();
        let exe = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();

        let paths = AppPaths::resolve(exe.path(), cwd.path(), Some(data.path().to_path_buf()), false);
        let base = data.path().join(APP_NAME);
        assert_eq!(paths.config, base.join(CONFIG_FILE));
        assert_eq!(paths.prefs_file(), base.join(PREFS_FILE));
        assert_eq!(paths.logs_dir, base.join("logs"));
    }

    #[test]
    fn test_overrides_and_directory_creation() {
        let temp = TempDir::new().unwrap();
        let paths = AppPaths::self_contained(temp.path())
            .with_config(temp.path().join("other.yaml"))
            .with_data_dir(temp.path().join("state"));

        paths.ensure_directories().unwrap();
        assert_eq!(paths.config, temp.path().join("other.yaml"));
        assert!(temp.path().join("state").join("templates").is_dir());
        assert!(temp.path().join("logs").is_dir());
    }
}
