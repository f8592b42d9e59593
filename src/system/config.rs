use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    pub supported_versions: Vec<u32>,
    pub emit_header: bool,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            supported_versions: vec![1],
            emit_header: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    #[serde(default)]
    pub versioning: VersioningConfig,
    #[serde(default)]
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            log: LogConfig {
                level: "info".to_string(),
            },
            versioning: VersioningConfig::default(),
            environment: "default".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("configs"), |key| env::var(key).ok())
    }

    /// Loads `<dir>/config.<APP_ENV>.json`, falling back to
    /// `<dir>/config.default.json` and then to built-in defaults, then applies
    /// environment overrides looked up through `lookup`.
    pub fn load_from(
        dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let environment = lookup("APP_ENV").unwrap_or_else(|| "default".to_string());

        let env_file = dir.join(format!("config.{}.json", environment));
        let default_file = dir.join("config.default.json");

        let mut config: AppConfig = if env_file.exists() {
            serde_json::from_str(&fs::read_to_string(&env_file)?)?
        } else if default_file.exists() {
            serde_json::from_str(&fs::read_to_string(&default_file)?)?
        } else {
            AppConfig::default()
        };

        // Environment field always reflects the actual environment
        config.environment = environment;
        config.apply_overrides(lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("SERVER_PORT: {}", port)))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(versions) = lookup("API_VERSIONS") {
            self.versioning.supported_versions = parse_versions(&versions)?;
        }
        if let Some(emit) = lookup("API_VERSION_HEADER") {
            self.versioning.emit_header = emit
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("API_VERSION_HEADER: {}", emit)))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.versioning.supported_versions.contains(&0) {
            return Err(ConfigError::Invalid(
                "API versions must be positive integers".to_string(),
            ));
        }
        Ok(())
    }
}

// "1, 2,10" -> [1, 2, 10]
fn parse_versions(value: &str) -> Result<Vec<u32>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim_start_matches(['v', 'V'])
                .parse::<u32>()
                .map_err(|_| ConfigError::Invalid(format!("API_VERSIONS: {}", part)))
        })
        .collect()
}
