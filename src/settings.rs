use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SharesubError};

pub const DB_FILE: &str = "sharesub.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// JSON snapshot read once when the store is empty. Relative paths are
    /// resolved against `data_dir`.
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            seed_file: None,
        }
    }
}

impl Settings {
    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed_file
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| resolve_against(Path::new(&self.data_dir), s))
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sharesub")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("sharesub")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SharesubError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Settings for this run: the saved ones, with `--data-dir` taking precedence.
pub fn effective_settings(data_dir_override: Option<&str>) -> Settings {
    let mut settings = load_settings();
    if let Some(dir) = data_dir_override {
        settings.data_dir = shellexpand_path(dir);
    }
    settings
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

fn resolve_against(base: &Path, path: &str) -> PathBuf {
    let expanded = match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path.trim()),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            seed_file: Some("seed.json".to_string()),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.seed_file.is_none());
        assert!(s.data_dir.ends_with("sharesub"));
        assert!(s.seed_path().is_none());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.data_dir, "/tmp/test");
        assert!(s.seed_file.is_none());
    }

    #[test]
    fn test_seed_path_resolution() {
        let mut s = Settings {
            data_dir: "/srv/sharesub-test-data".to_string(),
            seed_file: Some("db.json".to_string()),
        };
        assert_eq!(
            s.seed_path(),
            Some(PathBuf::from("/srv/sharesub-test-data/db.json"))
        );

        s.seed_file = Some("/opt/seed.json".to_string());
        assert_eq!(s.seed_path(), Some(PathBuf::from("/opt/seed.json")));

        s.seed_file = Some("  ".to_string());
        assert_eq!(s.seed_path(), None);
    }
}
