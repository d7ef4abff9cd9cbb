//! Hot reload of the YAML config file
//!
//! The parent directory is watched rather than the file, since editors
//! often save by writing a temp file and renaming it over the original.
//! Bursts of events are coalesced into one reload, and a reload that
//! parses to the config already in effect is not reported.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::AppConfig;

/// Quiet period after the last file event before reloading
const DEBOUNCE: Duration = Duration::from_millis(150);

/// Delivers each effective change of the config file
pub struct ConfigWatcher {
    /// `None` when the config file did not exist at start-up
    _watcher: Option<RecommendedWatcher>,
    rx: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Load the config at `config_path` and watch it for changes
    ///
    /// A missing file yields the default config and no watcher.
    pub async fn new(config_path: impl Into<PathBuf>) -> Result<(Self, Arc<AppConfig>)> {
        let config_path = config_path.into();
        let (tx, rx) = mpsc::channel(4);

        let initial = Arc::new(
            AppConfig::load_or_default(&config_path)
                .await
                .context("Failed to load initial config")?,
        );

        let Some(file_name) = config_path.file_name().map(OsString::from) else {
            anyhow::bail!("Config path has no file name: {}", config_path.display());
        };
        if !config_path.exists() {
            info!(
                "Config file {} not found, hot-reload disabled",
                config_path.display()
            );
            return Ok((Self { _watcher: None, rx }, initial));
        }

        let (touch_tx, touch_rx) = mpsc::unbounded_channel();
        // notify calls back on its own thread; only forward a wake-up
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if touches(&event, &file_name) => {
                debug!("Config file event: {:?}", event.kind);
                touch_tx.send(()).ok();
            }
            Ok(_) => {}
            Err(e) => warn!("Config watch error: {}", e),
        })?;

        let dir = watch_dir(&config_path);
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;
        info!("Watching {} for changes", config_path.display());

        tokio::spawn(reload_loop(
            config_path,
            (*initial).clone(),
            touch_rx,
            tx,
        ));

        Ok((
            Self {
                _watcher: Some(watcher),
                rx,
            },
            initial,
        ))
    }

    /// Wait for the next config update
    /// Returns None once the watcher is gone
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }
}

fn watch_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn touches(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

async fn reload_loop(
    path: PathBuf,
    mut current: AppConfig,
    mut touches: mpsc::UnboundedReceiver<()>,
    tx: mpsc::Sender<AppConfig>,
) {
    while touches.recv().await.is_some() {
        // Let the writer finish, then drop the events it queued meanwhile
        tokio::time::sleep(DEBOUNCE).await;
        while touches.try_recv().is_ok() {}

        match AppConfig::load(&path).await {
            Ok(next) if next == current => debug!("Config file saved without changes"),
            Ok(next) => {
                info!("Configuration reloaded");
                current = next.clone();
                if tx.send(next).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("Failed to reload config (keeping old config): {:#}", e),
        }
    }
    debug!("Config reload loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayTimezone;
    use std::fs;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_reload_delivers_new_timezone() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "display:\n  timezone: utc\n")?;

        let (mut watcher, config) = ConfigWatcher::new(&config_path).await?;
        assert_eq!(config.display.timezone, DisplayTimezone::Utc);

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "display:\n  timezone: \"+02:00\"\n")?;

        let reloaded = tokio::time::timeout(WAIT, watcher.next_config())
            .await?
            .expect("watcher closed without delivering a reload");
        assert_eq!(reloaded.display.timezone.to_string(), "+02:00");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_edit_keeps_watching() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "server:\n  port: 5000\n")?;

        let (mut watcher, _) = ConfigWatcher::new(&config_path).await?;

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "server:\n  port: 0\n")?;
        tokio::time::sleep(DEBOUNCE * 3).await;
        fs::write(&config_path, "server:\n  port: 6000\n")?;

        let reloaded = tokio::time::timeout(WAIT, watcher.next_config())
            .await?
            .expect("watcher closed without delivering a reload");
        assert_eq!(reloaded.server.port, 6000);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_disables_watching() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let (_watcher, config) = ConfigWatcher::new(temp_dir.path().join("none.yaml")).await?;
        assert_eq!(*config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn test_bare_file_name_watches_cwd() {
        assert_eq!(watch_dir(Path::new("config.yaml")), Path::new("."));
        assert_eq!(watch_dir(Path::new("/etc/homeboard/config.yaml")), Path::new("/etc/homeboard"));
    }
}
