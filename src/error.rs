//! Error types for page-mediator
//!
//! Two families live here:
//! - [`FetchError`] classifies failures of the remote fetch. These never escape
//!   `MediationEngine::load` as `Err`; they are reported inside the outcome.
//! - [`Error`] covers everything else (config, storage, I/O). Storage errors
//!   abort the load that raised them.

use thiserror::Error;

/// Failure of a single remote page fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    // ============================================================================
    // Transport failures
    // ============================================================================
    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    // ============================================================================
    // Remote errors
    // ============================================================================
    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl FetchError {
    /// Create a transport failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a remote error from a non-success status
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Connectivity / I-O level failure
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// The remote answered, but not with a usable page
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::InvalidResponse { .. })
    }

    /// Whether a caller-side retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Remote { status, .. } => is_retryable_status(*status),
            Self::InvalidResponse { .. } => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::invalid_response(e.to_string())
        } else {
            Self::transport(e.to_string())
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// The main error type for page-mediator
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    // ============================================================================
    // Remote Errors
    // ============================================================================
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Check if this error came from the local store
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage { .. } | Error::Database(_))
    }
}

/// Result type alias for page-mediator
pub type Result<T> = std::result::Result<T, Error>;
