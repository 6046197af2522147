use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::ingestion::SpaceTrackConfig;
use crate::screening::ScreeningConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub screening: ScreeningConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            base_dir: default_base_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestionConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Six-field cron expression; see [`crate::schedule::CronExpr`].
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default)]
    pub spacetrack: SpaceTrackConfig,
}

fn default_batch_size() -> usize {
    1000
}

fn default_schedule() -> String {
    "0 21 */6 * * *".to_string()
}

impl Default for IngestionConfig {
    fn default() -> Self {
        IngestionConfig {
            batch_size: default_batch_size(),
            schedule: default_schedule(),
            spacetrack: SpaceTrackConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
