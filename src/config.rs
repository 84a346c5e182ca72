use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Run configuration, persisted as JSON at `~/.medext/config.json`.
///
/// A default file is written on first run; host and username must be filled
/// in before the tool can connect. CLI flags override individual fields per
/// invocation without touching the file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    /// Restrict the run to these patient `Internal ID`s. Empty or absent
    /// means every manifest row.
    #[serde(default)]
    pub patient_ids: Option<Vec<u64>>,
}

impl Default for Config {
    fn default() -> Self {
        let downloads = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let desktop = dirs::desktop_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            manifest_path: downloads.join("PatientDocuments.csv"),
            output_dir: desktop.join("PatientRecords"),
            patient_ids: None,
        }
    }
}

impl Config {
    /// Load the persisted configuration, creating the app directory and a
    /// default config file on first run.
    pub fn init() -> Result<Self> {
        let home_dir = dirs::home_dir().context("cannot find user's home dir")?;
        let app_dir = crate::util::ensure_app_dir(&home_dir)?;
        let config_path = app_dir.join("config.json");
        if !config_path.exists() {
            let config = Config::default();
            config.save_to(&config_path)?;
            println!("Created default config at {}", config_path.display());
            return Ok(config);
        }
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("cannot read {}", config_path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", config_path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    /// The patient-id filter as a set; `None` disables filtering entirely.
    pub fn filter_set(&self) -> Option<HashSet<u64>> {
        match &self.patient_ids {
            Some(ids) if !ids.is_empty() => Some(ids.iter().copied().collect()),
            _ => None,
        }
    }
}
