use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::{
    default_sidebars, GlobalConfig, SidebarsConfig, CONFIG_VERSION, DEFAULT_SIDEBAR_ID,
};
use crate::migrate::migrate;

/// The on-disk blob. Everything is defaulted so a partially written or
/// hand-edited file still loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConfig {
    #[serde(default = "current_version")]
    pub config_version: u32,
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub sidebars: SidebarsConfig,
}

fn current_version() -> u32 {
    CONFIG_VERSION
}

impl Default for PersistedConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            global: GlobalConfig::default(),
            sidebars: default_sidebars(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dashbar")
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("sidebars.json")
}

pub fn save(config: &PersistedConfig) -> Result<()> {
    save_to(config, &config_file_path())
}

pub fn load() -> Option<PersistedConfig> {
    load_from(&config_file_path())
}

// Path-parameterized variants for testability

pub fn save_to(config: &PersistedConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

/// Loads and migrates the blob. Migration runs on the raw JSON before the
/// typed deserialize, so legacy flat-shape files load transparently. The
/// `default` sidebar is re-seeded if the file lost it.
pub fn load_from(path: &Path) -> Option<PersistedConfig> {
    let json = fs::read_to_string(path).ok()?;
    let raw: Value = serde_json::from_str(&json).ok()?;
    let mut config: PersistedConfig = serde_json::from_value(migrate(raw)).ok()?;
    ensure_default_sidebar(&mut config.sidebars);
    Some(config)
}

fn ensure_default_sidebar(sidebars: &mut SidebarsConfig) {
    sidebars
        .entry(DEFAULT_SIDEBAR_ID.to_string())
        .or_insert_with(super::default_sidebar);
}
