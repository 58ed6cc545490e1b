use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "ss-scp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) show_hidden: bool,
    pub(crate) ssh_program: String,
    pub(crate) scp_program: String,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) batch_mode: bool,
    pub(crate) last_host: Option<String>,
    pub(crate) last_local_dir: Option<String>,
    pub(crate) remote_dirs: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_hidden: false,
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            connect_timeout_secs: 10,
            batch_mode: true,
            last_host: None,
            last_local_dir: None,
            remote_dirs: BTreeMap::new(),
        }
    }
}

fn app_dir() -> Result<PathBuf> {
    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_DIR);
        return Ok(dir);
    }
    std::env::current_dir().context("current dir")
}

pub(crate) fn config_path() -> Result<PathBuf> {
    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_DIR);
        dir.push("config.json");
        return Ok(dir);
    }
    let mut fallback = std::env::current_dir().context("current dir")?;
    fallback.push("ss-scp-config.json");
    Ok(fallback)
}

pub(crate) fn log_path() -> Result<PathBuf> {
    let mut dir = app_dir()?;
    dir.push("ss-scp.log");
    Ok(dir)
}

pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path).context("read config file")?;
    let settings = serde_json::from_str(&content).context("parse config file")?;
    Ok(settings)
}

pub(crate) fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create config dir")?;
    }
    let content = serde_json::to_string_pretty(settings).context("serialize config")?;
    fs::write(path, content).context("write config file")?;
    Ok(())
}
