use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const DEFAULT_REMOTE_URL: &str = "https://github.com/runeward/modpack/raw/main/plugins.zip";

/// Persisted launcher settings. The target directory is always supplied by
/// the user (there is no game-path discovery here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    #[serde(default)]
    pub target_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub confirm_before_sync: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            remote_url: default_remote_url(),
            target_dir: None,
            confirm_before_sync: true,
        }
    }
}

impl LauncherConfig {
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_in(&base_data_dir()?)
    }

    pub fn load_or_create_in(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("create app data dir")?;
        let path = dir.join("config.json");
        if path.exists() {
            let raw = fs::read_to_string(&path).context("read config")?;
            let config: LauncherConfig = serde_json::from_str(&raw).context("parse config")?;
            return Ok(config);
        }

        let config = LauncherConfig::default();
        config.save_in(dir)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_in(&base_data_dir()?)
    }

    pub fn save_in(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).context("create app data dir")?;
        let path = dir.join("config.json");
        let raw = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, raw).context("write config")?;
        Ok(())
    }
}

fn default_remote_url() -> String {
    DEFAULT_REMOTE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn base_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    Ok(base.data_local_dir().join("runeward"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_load_writes_defaults_to_disk() {
        let tmp = TempDir::new().unwrap();
        let config = LauncherConfig::load_or_create_in(tmp.path()).unwrap();
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert!(config.target_dir.is_none());
        assert!(config.confirm_before_sync);
        assert!(tmp.path().join("config.json").exists());
    }

    #[test]
    fn saved_values_survive_a_reload() {
        let tmp = TempDir::new().unwrap();
        let mut config = LauncherConfig::load_or_create_in(tmp.path()).unwrap();
        config.remote_url = "https://example.com/pack.zip".to_string();
        config.target_dir = Some(PathBuf::from("/games/valheim/BepInEx/plugins"));
        config.save_in(tmp.path()).unwrap();

        let reloaded = LauncherConfig::load_or_create_in(tmp.path()).unwrap();
        assert_eq!(reloaded.remote_url, "https://example.com/pack.zip");
        assert_eq!(
            reloaded.target_dir.as_deref(),
            Some(Path::new("/games/valheim/BepInEx/plugins"))
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.json"), "{}").unwrap();
        let config = LauncherConfig::load_or_create_in(tmp.path()).unwrap();
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert!(config.confirm_before_sync);
    }
}
