use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapingError};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub browser: RenderConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound for reaching DOMContentLoaded.
    #[serde(with = "humantime_serde")]
    pub navigation_timeout: Duration,
    /// Blind wait after DOMContentLoaded so client-side rendering can settle.
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    pub chrome_executable: Option<PathBuf>,
    /// Caps simultaneously running browsers. Unbounded when unset.
    pub max_concurrent: Option<usize>,
    pub randomize_user_agent: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How many page images the storefront fallback scan looks at.
    pub fallback_image_limit: usize,
    pub fallback_keyword: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(2),
            chrome_executable: None,
            max_concurrent: None,
            randomize_user_agent: true,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_image_limit: 10,
            fallback_keyword: "product".to_string(),
        }
    }
}

impl Config {
    /// Apply the `PORT` environment value, if any, on top of the file settings.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<()> {
        let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        self.server.port = raw
            .parse()
            .map_err(|_| ScrapingError::ConfigError(format!("Invalid PORT value '{}'", raw)))?;
        info!("Listen port overridden by environment: {}", self.server.port);
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[async_trait::async_trait]
pub trait ConfigManager {
    async fn load_config(&self) -> Result<Config>;
    async fn save_config(&self, config: &Config) -> Result<()>;
    fn validate_config(&self, config: &Config) -> Result<()>;
}

pub struct FileConfigManager {
    config_path: PathBuf,
}

impl FileConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }
}

#[async_trait::async_trait]
impl ConfigManager for FileConfigManager {
    async fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {:?}", self.config_path);

        if !self.config_path.exists() {
            warn!("Configuration file not found, creating default config at {:?}", self.config_path);
            self.save_config(&Config::default()).await?;
        }

        let config_content = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&config_content)?;

        self.validate_config(&config)?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    async fn save_config(&self, config: &Config) -> Result<()> {
        info!("Saving configuration to {:?}", self.config_path);

        let toml_content = toml::to_string_pretty(config)?;

        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.config_path, toml_content)?;

        Ok(())
    }

    fn validate_config(&self, config: &Config) -> Result<()> {
        debug!("Validating configuration");

        if config.server.host.trim().is_empty() {
            return Err(ScrapingError::ConfigError("server.host cannot be empty".to_string()));
        }
        if config.server.port == 0 {
            return Err(ScrapingError::ConfigError("server.port must be between 1 and 65535".to_string()));
        }

        if config.browser.navigation_timeout.is_zero() {
            return Err(ScrapingError::ConfigError("browser.navigation_timeout must be greater than 0".to_string()));
        }
        if config.browser.max_concurrent == Some(0) {
            return Err(ScrapingError::ConfigError("browser.max_concurrent must be greater than 0 when set".to_string()));
        }
        if let Some(ref path) = config.browser.chrome_executable {
            if !path.exists() {
                return Err(ScrapingError::ConfigError(format!("Chrome executable not found: {:?}", path)));
            }
        }

        if config.extraction.fallback_image_limit == 0 {
            return Err(ScrapingError::ConfigError("extraction.fallback_image_limit must be greater than 0".to_string()));
        }
        if config.extraction.fallback_keyword.trim().is_empty() {
            return Err(ScrapingError::ConfigError("extraction.fallback_keyword cannot be empty".to_string()));
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = FileConfigManager::new(config_path.clone());

        let config = manager.load_config().await.unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.browser.navigation_timeout, Duration::from_secs(30));
        assert_eq!(config.browser.settle_delay, Duration::from_secs(2));
        assert_eq!(config.extraction.fallback_image_limit, 10);
        assert_eq!(config.extraction.fallback_keyword, "product");
        assert!(config_path.exists());
    }

    #[tokio::test]
    async fn test_load_partial_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[browser]
navigation_timeout = "45s"
settle_delay = "500ms"
max_concurrent = 4

[extraction]
fallback_image_limit = 20
"#,
        )
        .unwrap();

        let config = FileConfigManager::new(config_path).load_config().await.unwrap();

        assert_eq!(config.browser.navigation_timeout, Duration::from_secs(45));
        assert_eq!(config.browser.settle_delay, Duration::from_millis(500));
        assert_eq!(config.browser.max_concurrent, Some(4));
        assert_eq!(config.extraction.fallback_image_limit, 20);
        assert_eq!(config.extraction.fallback_keyword, "product");
        assert_eq!(config.server.port, 5000);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[server\nport = ").unwrap();

        let result = FileConfigManager::new(config_path).load_config().await;
        assert!(matches!(result, Err(ScrapingError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_load_unreadable_path_is_config_error() {
        let temp_dir = tempdir().unwrap();

        // a directory exists but cannot be read as a file
        let result = FileConfigManager::new(temp_dir.path().to_path_buf()).load_config().await;
        assert!(matches!(result, Err(ScrapingError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let manager = FileConfigManager::new(config_path.clone());

        let mut config = Config::default();
        config.server.port = 8081;
        manager.save_config(&config).await.unwrap();

        assert_eq!(manager.load_config().await.unwrap().server.port, 8081);
    }

    #[test]
    fn test_config_validation() {
        let manager = FileConfigManager::new(PathBuf::from("test.toml"));

        assert!(manager.validate_config(&Config::default()).is_ok());

        let mut invalid_config = Config::default();
        invalid_config.server.port = 0;
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.browser.navigation_timeout = Duration::ZERO;
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.browser.max_concurrent = Some(0);
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.extraction.fallback_image_limit = 0;
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.extraction.fallback_keyword = "  ".to_string();
        assert!(manager.validate_config(&invalid_config).is_err());
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();

        config.apply_port_override(None).unwrap();
        assert_eq!(config.server.port, 5000);

        config.apply_port_override(Some("8080")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");

        assert!(config.apply_port_override(Some("not-a-port")).is_err());
        assert!(config.apply_port_override(Some("70000")).is_err());
    }
}
