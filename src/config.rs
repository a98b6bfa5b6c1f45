use ptrainer_core::{default_reset_url, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Root of the REST API, e.g. `https://host/api/`
    pub api_url: ConfigValue<String>,
    /// Endpoint that restores the demo data
    pub reset_url: ConfigValue<String>,
    /// HTTP request timeout in seconds
    pub timeout_secs: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    reset_url: Option<String>,
    timeout_secs: Option<u64>,
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut api_url = ConfigValue::new(DEFAULT_API_URL.to_string(), ConfigSource::Default);
        let mut reset_url = None;
        let mut timeout_secs = ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(url) = file_config.reset_url {
                reset_url = Some(ConfigValue::new(url, ConfigSource::File));
            }
            if let Some(secs) = file_config.timeout_secs {
                timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("PTRAINER_API_URL") {
            api_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("PTRAINER_RESET_URL") {
            reset_url = Some(ConfigValue::new(url, ConfigSource::Environment));
        }
        if let Ok(secs) = std::env::var("PTRAINER_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("PTRAINER_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
            timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        if timeout_secs.value == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_secs".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // The default reset endpoint lives next to whichever API root won
        let reset_url = match reset_url {
            Some(url) => url,
            None => {
                let url = default_reset_url(&api_url.value)
                    .map_err(|e| ConfigError::InvalidValue("api_url".to_string(), e.to_string()))?;
                ConfigValue::new(url, ConfigSource::Default)
            }
        };

        Ok(Self {
            api_url,
            reset_url,
            timeout_secs,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/ptrainer/
    /// - macOS: ~/Library/Application Support/ptrainer/
    /// - Windows: %APPDATA%/ptrainer/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ptrainer")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, reason) => {
                write!(f, "Invalid config value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
