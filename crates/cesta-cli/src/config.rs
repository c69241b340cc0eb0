use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub cache: CacheSettings,
    pub rest: Option<Rest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheSettings {
    pub db_path: Option<PathBuf>,
}

/// Hosted table endpoint. Absent section means pure-local mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rest {
    pub url: String,
    pub api_key: String,
    pub table: Option<String>,
    /// Change-feed poll interval in milliseconds; defaults to 2000 when unset
    pub poll_ms: Option<u64>,
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("cesta")
    } else {
        PathBuf::from("./.config/cesta")
    }
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if let Ok(s) = std::fs::read_to_string(&path) {
        toml::from_str(&s).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn default_db_path() -> PathBuf {
    let p = config_dir().join("db").join("cesta.db");
    let _ = std::fs::create_dir_all(p.parent().expect("db path has a parent"));
    p
}
