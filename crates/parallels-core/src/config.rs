use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PANEL_WIDTH: u16 = 40;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub text_source: Option<String>,
    pub mapping_source: Option<String>,
    /// Share of the screen width given to the side panel, in percent.
    pub panel_width_percent: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_source: None,
            mapping_source: None,
            panel_width_percent: DEFAULT_PANEL_WIDTH,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn panel_width(&self) -> u16 {
        self.panel_width_percent.clamp(20, 80)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("parallels").join("config.json"))
    }
}
