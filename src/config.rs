//! Configuration system using TOML files plus environment overrides.
//!
//! Config is read from the OS-standard config directory unless a path is
//! given on the command line:
//! - Windows: %APPDATA%\book-catalog\config.toml
//! - macOS: ~/Library/Application Support/book-catalog/config.toml
//! - Linux: ~/.config/book-catalog/config.toml
//!
//! Every section is optional. Environment variables (the names used by
//! existing deployments, e.g. `STORAGE_TYPE`, `JSONBIN_BIN_ID`,
//! `DB_POSTGRES_HOST`) override values from the file.
//!
//! The storage mode is kept as free text here and only parsed when a backend
//! is opened, so an unknown mode fails at startup instead of silently
//! falling back to defaults with the rest of a malformed file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::enrichment::CoverSize;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend selection and local file settings
    pub storage: StorageConfig,

    /// Hosted document store settings
    pub hosted: HostedConfig,

    /// Relational database settings
    pub database: DatabaseConfig,

    /// Open Library enrichment settings
    pub enrichment: EnrichmentSettings,
}

/// Which backend to use and where the local file lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// "file", "jsonbin" or "db" (see [`StorageMode`] for aliases)
    pub mode: String,

    /// Location of the JSON document for the file backend
    pub file_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: StorageMode::File.as_str().to_string(),
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
        }
    }
}

/// Default location of the JSON document, relative to the working directory.
pub const DEFAULT_FILE_PATH: &str = "data/books.json";

/// Hosted document store (JSONBin-style) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    /// API endpoint; the bin id is appended as a path segment
    pub url: String,
    pub bin_id: Option<String>,
    pub master_key: Option<String>,
    pub access_key: Option<String>,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            url: "https://api.jsonbin.io/v3/b".to_string(),
            bin_id: None,
            master_key: None,
            access_key: None,
        }
    }
}

/// Relational database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; when set, the individual fields below are ignored
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "library".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Connection URL: the explicit `url`, or a PostgreSQL URL assembled
    /// from the individual fields.
    pub fn connection_url(&self) -> String {
        match self.url {
            Some(ref url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password),
                self.host,
                self.port,
                self.name
            ),
        }
    }
}

/// Open Library enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    /// Turn enrichment off entirely (records keep empty enrichment fields)
    pub enabled: bool,
    pub search_base_url: String,
    pub covers_base_url: String,
    pub cover_size: CoverSize,
    /// Upper bound for each Open Library request
    pub timeout_secs: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            search_base_url: "https://openlibrary.org".to_string(),
            covers_base_url: "https://covers.openlibrary.org/b".to_string(),
            cover_size: CoverSize::default(),
            timeout_secs: 10,
        }
    }
}

/// Storage backend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Local JSON document
    File,
    /// Remote JSON document (JSONBin)
    Hosted,
    /// SQL database, one row per book
    Relational,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageMode::File => "file",
            StorageMode::Hosted => "jsonbin",
            StorageMode::Relational => "db",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(StorageMode::File),
            "jsonbin" | "hosted" | "hosted-document" => Ok(StorageMode::Hosted),
            "db" | "relational" | "postgres" | "sql" => Ok(StorageMode::Relational),
            other => Err(ConfigError::UnknownStorageMode(other.to_string())),
        }
    }
}

impl Config {
    /// Parse the configured storage mode.
    pub fn storage_mode(&self) -> Result<StorageMode, ConfigError> {
        self.storage.mode.parse()
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Takes the lookup as a function so tests don't have to mutate the
    /// process environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(mode) = var("STORAGE_TYPE") {
            self.storage.mode = mode;
        }
        if let Some(path) = var("BOOKS_FILE_PATH") {
            self.storage.file_path = PathBuf::from(path);
        }

        if let Some(url) = var("JSONBIN_URL") {
            self.hosted.url = url;
        }
        if let Some(bin_id) = var("JSONBIN_BIN_ID") {
            self.hosted.bin_id = Some(bin_id);
        }
        if let Some(key) = var("JSONBIN_X_MASTER_KEY") {
            self.hosted.master_key = Some(key);
        }
        if let Some(key) = var("JSONBIN_X_ACCESS_KEY") {
            self.hosted.access_key = Some(key);
        }

        if let Some(url) = var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = var("DB_POSTGRES_HOST") {
            self.database.host = host;
        }
        if let Some(port) = var("DB_POSTGRES_PORT") {
            self.database.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "DB_POSTGRES_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(user) = var("DB_POSTGRES_USER") {
            self.database.user = user;
        }
        if let Some(password) = var("DB_POSTGRES_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = var("DB_POSTGRES_DB") {
            self.database.name = name;
        }

        Ok(())
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("book-catalog"))
}

/// Get the full path to the default config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if the file doesn't exist or can't be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file
///
/// Logs problems but doesn't fail - we always return a usable config.
/// Semantic checks (storage mode, hosted credentials) happen later, when the
/// backend is opened.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown storage type '{0}' (expected file, jsonbin or db)")]
    UnknownStorageMode(String),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

// ============================================================================
// Tests
// ============================================================================
