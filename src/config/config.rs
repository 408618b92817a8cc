use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub docker: DockerConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub token: String,
    pub allowed_chat_ids: Vec<i64>,
    pub owner_id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DockerConfig {
    pub container_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub properties_file: String,
    pub backup_script: String,
    /// Public address handed out by the "Copy IP" button. When unset the
    /// bot falls back to an external lookup.
    #[serde(default)]
    pub ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_mem_threshold")]
    pub mem_threshold_percent: f64,
    #[serde(default = "default_alert_cooldown")]
    pub alert_cooldown_secs: u64,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_mem_threshold() -> f64 {
    90.0
}

fn default_alert_cooldown() -> u64 {
    1800
}

fn default_interval() -> u64 {
    3600
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            mem_threshold_percent: default_mem_threshold(),
            alert_cooldown_secs: default_alert_cooldown(),
            interval_secs: default_interval(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// The server's data directory, derived from the properties file
    /// location. usercache.json and world/stats/ live underneath it.
    pub fn data_dir(&self) -> PathBuf {
        Path::new(&self.server.properties_file)
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
