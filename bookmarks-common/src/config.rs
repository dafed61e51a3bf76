//! Configuration loading and root folder resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file never stops startup: it is logged and the
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Application folder name under the platform config/data directories
pub const APP_DIR_NAME: &str = "smart-bookmarks";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "bookmarks.db";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "BOOKMARKS_ROOT_FOLDER";

/// Environment variable pointing at an explicit config file
pub const CONFIG_FILE_ENV: &str = "BOOKMARKS_CONFIG";

// ========================================
// TOML Schema
// ========================================

/// Contents of `config.toml`
///
/// All fields are optional; absent values fall back to [`CompiledDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    /// Externally visible base URL, used to build the sign-in callback address
    pub public_url: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Session Provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Upstream identity provider name passed through on sign-in
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Authorization endpoint; relative paths resolve against `public_url`
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    /// Extra query parameters appended to the authorization URL
    #[serde(default = "default_query_params")]
    pub query_params: BTreeMap<String, String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            authorize_url: default_authorize_url(),
            session_ttl_hours: default_session_ttl_hours(),
            query_params: default_query_params(),
        }
    }
}

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

impl IdentityConfig {
    /// `session_ttl_hours`, capped at [`MAX_SESSION_TTL_HOURS`]
    pub fn bounded_session_ttl_hours(&self) -> u64 {
        if self.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            warn!(
                "session_ttl_hours = {} exceeds the maximum, using {}",
                self.session_ttl_hours, MAX_SESSION_TTL_HOURS
            );
            return MAX_SESSION_TTL_HOURS;
        }
        self.session_ttl_hours
    }
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_authorize_url() -> String {
    "/auth/dev-login".to_string()
}

fn default_session_ttl_hours() -> u64 {
    720
}

fn default_query_params() -> BTreeMap<String, String> {
    // Forces the provider to show account selection on every sign-in
    BTreeMap::from([
        ("access_type".to_string(), "offline".to_string()),
        ("prompt".to_string(), "consent".to_string()),
    ])
}

impl TomlConfig {
    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Load config, degrading to defaults when the file is absent or invalid
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            info!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using compiled defaults", e);
                Self::default()
            }
        }
    }
}

// ========================================
// Compiled Defaults
// ========================================

/// Fallback values compiled into the binary
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            bind_address: "127.0.0.1:5780".to_string(),
            log_level: default_log_level(),
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./bookmarks_data"))
}

/// Locate the config file: explicit path, then env var, then the platform location
///
/// Returns `None` when nothing exists on disk.
pub fn locate_config_file(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join("config.toml"))
        .filter(|p| p.exists())
}

// ========================================
// Root Folder Resolution
// ========================================

/// Resolves the root folder holding the database
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_value = config.root_folder.clone();
        self
    }

    /// Resolve using CLI → ENV → TOML → compiled default
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            info!("Root folder from config file: {}", path.display());
            return path.clone();
        }

        let path = CompiledDefaults::for_current_platform().root_folder;
        info!("Root folder from compiled default: {}", path.display());
        path
    }
}

/// Creates the root folder and derives paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}
