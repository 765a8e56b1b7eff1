//! Error types for releasewatch.

use thiserror::Error;

/// Main error type for releasewatch operations.
#[derive(Error, Debug)]
pub enum ReleasewatchError {
    // Cli args errors
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    // Network/API errors
    #[error("Network request failed: {0}")]
    NetworkError(String),

    #[error("Upstream API returned {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid version format: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    #[error("Source parse error: {0}")]
    SyntaxError(String),

    #[error("Command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReleasewatchError
pub type Result<T> = std::result::Result<T, ReleasewatchError>;

impl ReleasewatchError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid report error
    pub fn invalid_report(msg: impl Into<String>) -> Self {
        Self::InvalidReport(msg.into())
    }

    /// Create a failed command error
    pub fn command_failed(
        command: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for ReleasewatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for reqwest errors (network/API)
impl From<reqwest::Error> for ReleasewatchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 429 => Self::RateLimitExceeded,
            Some(status) => Self::UpstreamStatus {
                status: status.as_u16(),
                url: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
            },
            None => Self::NetworkError(err.to_string()),
        }
    }
}

// Implement From for reqwest header errors (needs custom message)
impl From<reqwest::header::InvalidHeaderValue> for ReleasewatchError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidConfig(format!("Invalid header value: {}", err))
    }
}
