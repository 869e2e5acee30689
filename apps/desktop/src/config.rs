use core_types::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

const MAX_RECENT: usize = 5;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config data: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(not(target_os = "windows"))]
    #[error("Unable to locate configuration directory")]
    MissingConfigPath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub recent_outputs: Vec<PathBuf>,
    pub last_strategy: Option<Strategy>,
    #[serde(default)]
    pub last_composed_timestamps: HashMap<PathBuf, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recent_outputs: Vec::new(),
            last_strategy: None,
            last_composed_timestamps: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn record_output(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.recent_outputs.retain(|existing| existing != &path);
        self.recent_outputs.insert(0, path);
        if self.recent_outputs.len() > MAX_RECENT {
            self.recent_outputs.truncate(MAX_RECENT);
        }

        // Timestamps only exist for paths still on the recents list.
        let recents = &self.recent_outputs;
        self.last_composed_timestamps
            .retain(|recorded, _| recents.contains(recorded));
    }
}

#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<Mutex<AppConfig>>,
}

impl ConfigStore {
    pub fn load() -> Result<Self> {
        let cfg = load_impl()?;
        Ok(Self::from_config(cfg))
    }

    pub fn new_default() -> Self {
        Self::from_config(AppConfig::default())
    }

    fn from_config(cfg: AppConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cfg)),
        }
    }

    pub fn last_strategy(&self) -> Option<Strategy> {
        self.inner.lock().expect("config poisoned").last_strategy
    }

    pub fn record_output(&self, path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref().to_path_buf();
        self.update(|cfg| {
            cfg.record_output(&path);
            true
        })
    }

    pub fn set_last_strategy(&self, strategy: Strategy) -> Result<AppConfig> {
        self.update(|cfg| {
            if cfg.last_strategy == Some(strategy) {
                return false;
            }
            cfg.last_strategy = Some(strategy);
            true
        })
    }

    pub fn record_composed(&self, path: impl AsRef<Path>, timestamp: &str) -> Result<AppConfig> {
        let path = path.as_ref().to_path_buf();
        let ts = timestamp.to_string();
        self.update(|cfg| {
            cfg.last_composed_timestamps.insert(path.clone(), ts.clone());
            true
        })
    }

    fn update<F>(&self, mut fun: F) -> Result<AppConfig>
    where
        F: FnMut(&mut AppConfig) -> bool,
    {
        let mut guard = self.inner.lock().expect("config poisoned");
        let changed = fun(&mut guard);
        if changed {
            save_impl(&guard)?;
        }
        Ok(guard.clone())
    }
}

#[cfg(target_os = "windows")]
fn load_impl() -> Result<AppConfig> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_READ};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu
        .open_subkey_with_flags("Software\\CollageMill", KEY_READ)
        .ok();

    if let Some(key) = key {
        if let Ok(payload) = key.get_value::<String, _>("AppConfig") {
            return Ok(serde_json::from_str(&payload)?);
        }
    }

    Ok(AppConfig::default())
}

#[cfg(target_os = "windows")]
fn save_impl(cfg: &AppConfig) -> Result<()> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_WRITE};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey_with_flags("Software\\CollageMill", KEY_WRITE)?;
    let payload = serde_json::to_string(cfg)?;
    key.set_value("AppConfig", &payload)?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn load_impl() -> Result<AppConfig> {
    let path = config_file_path()?;
    if path.exists() {
        let payload = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&payload)?)
    } else {
        Ok(AppConfig::default())
    }
}

#[cfg(not(target_os = "windows"))]
fn save_impl(cfg: &AppConfig) -> Result<()> {
    let path = config_file_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(cfg)?;
    std::fs::write(path, payload)?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn config_file_path() -> Result<PathBuf> {
    use directories::ProjectDirs;

    let proj_dirs = ProjectDirs::from("com", "CollageMill", "CollageMill")
        .ok_or(ConfigError::MissingConfigPath)?;
    let mut path = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&path)?;
    path.push("app_config.json");
    Ok(path)
}
