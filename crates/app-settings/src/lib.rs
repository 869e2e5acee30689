use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppSettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings path unavailable")]
    MissingSettingsPath,
}

pub type Result<T> = std::result::Result<T, AppSettingsError>;

/// Where the save dialog should start the next time a collage is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    pub last_output_dir: Option<PathBuf>,
    #[serde(default)]
    pub last_file_name: Option<String>,
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        load_impl()
    }

    pub fn save(&self) -> Result<()> {
        save_impl(self)
    }

    pub fn get_last_output_dir(&self) -> Option<PathBuf> {
        self.last_output_dir.clone()
    }

    /// Record where a collage was just written so the next save dialog can
    /// start from the same place.
    pub fn remember_output(&mut self, path: &Path) {
        self.last_output_dir = path.parent().map(Path::to_path_buf);
        self.last_file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
    }

    pub fn suggested_file_name(&self) -> String {
        self.last_file_name
            .clone()
            .unwrap_or_else(|| "collage.png".to_string())
    }
}

#[cfg(target_os = "windows")]
fn load_impl() -> Result<AppSettings> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_READ};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu
        .open_subkey_with_flags("Software\\CollageMill", KEY_READ)
        .ok();

    let mut settings = AppSettings::default();
    if let Some(key) = key {
        if let Ok(path) = key.get_value::<String, _>("LastOutputDir") {
            settings.last_output_dir = Some(PathBuf::from(path));
        }
        if let Ok(name) = key.get_value::<String, _>("LastFileName") {
            settings.last_file_name = Some(name);
        }
    }

    Ok(settings)
}

#[cfg(target_os = "windows")]
fn save_impl(settings: &AppSettings) -> Result<()> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_WRITE};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey_with_flags("Software\\CollageMill", KEY_WRITE)?;

    if let Some(path) = &settings.last_output_dir {
        let value = path.to_string_lossy();
        key.set_value("LastOutputDir", &value.as_ref())?;
    } else {
        let _ = key.delete_value("LastOutputDir");
    }

    if let Some(name) = &settings.last_file_name {
        key.set_value("LastFileName", name)?;
    } else {
        let _ = key.delete_value("LastFileName");
    }

    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn load_impl() -> Result<AppSettings> {
    let path = settings_file_path()?;
    if path.exists() {
        let content = std::fs::read_to_string(&path)?;
        let settings: AppSettings = serde_json::from_str(&content)?;
        Ok(settings)
    } else {
        Ok(AppSettings::default())
    }
}

#[cfg(not(target_os = "windows"))]
fn save_impl(settings: &AppSettings) -> Result<()> {
    let path = settings_file_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, payload)?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn settings_file_path() -> Result<PathBuf> {
    let base = directories::BaseDirs::new().ok_or(AppSettingsError::MissingSettingsPath)?;
    let mut path = base.home_dir().to_path_buf();
    path.push("Library");
    path.push("Preferences");
    path.push("com.collagemill");
    std::fs::create_dir_all(&path)?;
    path.push("settings.json");
    Ok(path)
}

#[cfg(all(not(target_os = "macos"), not(target_os = "windows")))]
fn settings_file_path() -> Result<PathBuf> {
    let base = directories::BaseDirs::new().ok_or(AppSettingsError::MissingSettingsPath)?;
    let mut path = base.config_dir().to_path_buf();
    path.push("collagemill");
    std::fs::create_dir_all(&path)?;
    path.push("settings.json");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_output_splits_directory_and_file_name() {
        let mut settings = AppSettings::default();
        settings.remember_output(Path::new("/pictures/vacation/family.png"));

        assert_eq!(
            settings.get_last_output_dir(),
            Some(PathBuf::from("/pictures/vacation"))
        );
        assert_eq!(settings.suggested_file_name(), "family.png");
    }

    #[test]
    fn suggested_file_name_defaults_to_collage_png() {
        let settings = AppSettings::default();
        assert_eq!(settings.suggested_file_name(), "collage.png");
    }
}
