//! Configuration types
//!
//! `MediatorConfig` is loaded from YAML and split into the sections each
//! component consumes. Nothing reads configuration from ambient state; the
//! paging sizes in particular travel with every `load` call inside
//! `PagingState`.

use crate::error::{Error, Result};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete mediator configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediatorConfig {
    /// Remote listing API
    pub remote: RemoteConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Page sizes
    #[serde(default)]
    pub paging: PagingConfig,

    /// Local cache location
    #[serde(default)]
    pub store: StoreConfig,

    /// Refresh on start even when the partition is already cached
    #[serde(default = "default_true")]
    pub refresh_on_start: bool,
}

fn default_true() -> bool {
    true
}

impl MediatorConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Check all sections
    pub fn validate(&self) -> Result<()> {
        self.remote.validate()?;
        self.http.validate()?;
        self.paging.validate()?;
        Ok(())
    }
}

// ============================================================================
// Remote
// ============================================================================

/// Where and how to fetch pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL (e.g., "https://www.reddit.com")
    pub base_url: String,

    /// Path template, `{partition}` is substituted
    #[serde(default = "default_path")]
    pub path: String,

    /// Query parameter carrying the "after" cursor
    #[serde(default = "default_after_param")]
    pub after_param: String,

    /// Query parameter carrying the "before" cursor
    #[serde(default = "default_before_param")]
    pub before_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Response layout
    #[serde(default)]
    pub listing: ListingConfig,
}

fn default_path() -> String {
    "/r/{partition}/hot.json".to_string()
}

fn default_after_param() -> String {
    "after".to_string()
}

fn default_before_param() -> String {
    "before".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

impl RemoteConfig {
    /// Remote config with default layout for `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: default_path(),
            after_param: default_after_param(),
            before_param: default_before_param(),
            limit_param: default_limit_param(),
            listing: ListingConfig::default(),
        }
    }

    /// Override the path template
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("remote.base_url"));
        }
        url::Url::parse(&self.base_url)?;
        if !self.path.contains("{partition}") {
            return Err(Error::invalid_value(
                "remote.path",
                "must contain the {partition} placeholder",
            ));
        }
        Ok(())
    }
}

/// Dotted paths into a listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Array of records
    #[serde(default = "default_records_path")]
    pub records_path: String,

    /// Item object inside each record (empty = the record itself)
    #[serde(default = "default_item_path")]
    pub item_path: String,

    /// Cursor for the following page
    #[serde(default = "default_after_path")]
    pub after_path: String,

    /// Cursor for the preceding page
    #[serde(default = "default_before_path")]
    pub before_path: String,

    /// Identity field inside the item
    #[serde(default = "default_name_field")]
    pub name_field: String,
}

fn default_records_path() -> String {
    "data.children".to_string()
}

fn default_item_path() -> String {
    "data".to_string()
}

fn default_after_path() -> String {
    "data.after".to_string()
}

fn default_before_path() -> String {
    "data.before".to_string()
}

fn default_name_field() -> String {
    "name".to_string()
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            records_path: default_records_path(),
            item_path: default_item_path(),
            after_path: default_after_path(),
            before_path: default_before_path(),
            name_field: default_name_field(),
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retries (0 disables)
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub backoff: BackoffType,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Requests per second (0 disables rate limiting)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst_size() -> u32 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("http.timeout_secs", "must be > 0"));
        }
        if self.requests_per_second > 0 && self.burst_size == 0 {
            return Err(Error::invalid_value(
                "http.burst_size",
                "must be > 0 when rate limiting is enabled",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Paging
// ============================================================================

/// Page sizes requested from the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PagingConfigDef")]
pub struct PagingConfig {
    /// Steady-state page size (append)
    pub page_size: u32,
    /// Size of the first page (refresh)
    pub initial_load_size: u32,
}

const DEFAULT_PAGE_SIZE: u32 = 20;
const INITIAL_LOAD_MULTIPLIER: u32 = 3;

impl PagingConfig {
    /// Config with `initial_load_size = 3 * page_size`
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            initial_load_size: page_size.saturating_mul(INITIAL_LOAD_MULTIPLIER),
        }
    }

    /// Override the initial load size
    #[must_use]
    pub fn with_initial_load_size(mut self, size: u32) -> Self {
        self.initial_load_size = size;
        self
    }

    /// Reject zero sizes
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("paging.page_size", "must be > 0"));
        }
        if self.initial_load_size == 0 {
            return Err(Error::invalid_value(
                "paging.initial_load_size",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Deserialize)]
struct PagingConfigDef {
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    initial_load_size: Option<u32>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl From<PagingConfigDef> for PagingConfig {
    fn from(def: PagingConfigDef) -> Self {
        let config = Self::new(def.page_size);
        match def.initial_load_size {
            Some(size) => config.with_initial_load_size(size),
            None => config,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Local cache location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// DuckDB file path, or ":memory:"
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "page-cache.duckdb".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl StoreConfig {
    /// Check if the cache lives in memory only
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
