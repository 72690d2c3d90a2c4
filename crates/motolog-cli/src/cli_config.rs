//! Persistent CLI configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use motolog_core::config::{default_relays, parse_relay_list};
use motolog_core::preferences::PreferenceStore;
use motolog_core::RelayConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";
const CONFIG_PATH_ENV: &str = "MOTOLOG_CONFIG";
const RELAYS_ENV: &str = "MOTOLOG_RELAYS";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Relays to use; empty means the built-in defaults
    #[serde(default)]
    pub relays: Vec<String>,
    #[serde(default)]
    pub active_vehicle: Option<String>,
    /// Saved preferences, keyed like the core preference keys
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default()
        .join("motolog")
        .join(CONFIG_FILE_NAME)
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self {
                version: default_config_version(),
                ..Self::default()
            });
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path();
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Relay settings, in order of precedence: `--relay` flags,
    /// `MOTOLOG_RELAYS`, the saved list, the defaults.
    pub fn relay_config(&self, explicit: &[String]) -> RelayConfig {
        let env = std::env::var(RELAYS_ENV).ok();
        RelayConfig::with_relays(resolve_relays(explicit, env.as_deref(), &self.relays))
    }

    fn normalize(&mut self) {
        self.relays = RelayConfig::with_relays(std::mem::take(&mut self.relays)).relays;
        self.active_vehicle = motolog_core::util::normalize_text_option(self.active_vehicle.take());
        if self.version == 0 {
            self.version = default_config_version();
        }
    }
}

pub fn resolve_relays(explicit: &[String], env: Option<&str>, saved: &[String]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    if let Some(relays) = env.map(parse_relay_list).filter(|relays| !relays.is_empty()) {
        return relays;
    }
    if !saved.is_empty() {
        return saved.to_vec();
    }
    default_relays()
}

impl PreferenceStore for CliConfig {
    fn get(&self, key: &str) -> motolog_core::Result<Option<String>> {
        Ok(self.preferences.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> motolog_core::Result<()> {
        self.preferences.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> motolog_core::Result<()> {
        self.preferences.remove(key);
        Ok(())
    }
}
