use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub redirect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36".into(),
            timeout_secs: 15,
            redirect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub catalog_path: PathBuf,
    pub snapshot_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("games.json"),
            snapshot_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 0 builds the catalog once and exits.
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub channel_url: String,
    pub pages: usize,
    pub page_delay_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_url: "https://t.me/s/freegames".into(),
            pages: 10,
            page_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GamerPowerWebConfig {
    pub enabled: bool,
    pub base_url: String,
    pub pages: usize,
    pub workers: usize,
}

impl Default for GamerPowerWebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.gamerpower.com/all/free-games".into(),
            pages: 2,
            workers: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GamerPowerApiConfig {
    pub enabled: bool,
    pub url: String,
    pub workers: usize,
}

impl Default for GamerPowerApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://www.gamerpower.com/api/filter".into(),
            workers: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub telegram: TelegramConfig,
    pub gamerpower_web: GamerPowerWebConfig,
    pub gamerpower_api: GamerPowerApiConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub schedule: ScheduleConfig,
    pub sources: SourcesConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let environment = env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let config_file = match environment.as_str() {
            "production" => "prod",
            _ => "dev",
        };

        let s = ConfigLoader::builder()
            .add_source(File::with_name("config/default.yaml").required(false))
            .add_source(File::with_name(&format!("config/{}.yaml", config_file)).required(false))
            .add_source(File::with_name("config/local.yaml").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(s.try_deserialize()?)
    }
}
