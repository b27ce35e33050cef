use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapingError>;

#[derive(Error, Debug)]
pub enum ScrapingError {
    #[error("The \"url\" parameter is required")]
    MissingParameter,

    #[error("Unsupported site: {domain}. Supported sites: {supported}")]
    UnsupportedSite { domain: String, supported: String },

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Navigation to {url} timed out after {}ms", .timeout.as_millis())]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ScrapingError {
    /// Only a missing `url` is the caller's fault; every other outcome is
    /// signalled in the response body.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScrapingError::MissingParameter)
    }
}

// Conversion implementations for common error types
impl From<std::io::Error> for ScrapingError {
    fn from(err: std::io::Error) -> Self {
        ScrapingError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for ScrapingError {
    fn from(err: toml::de::Error) -> Self {
        ScrapingError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for ScrapingError {
    fn from(err: toml::ser::Error) -> Self {
        ScrapingError::ConfigError(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for ScrapingError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScrapingError::BrowserError(err.to_string())
    }
}
