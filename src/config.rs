//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub ui_state: UiStateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote config service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the Oko backend (e.g., "http://localhost:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `X-Oko-Actor` header
    #[serde(default = "default_actor")]
    pub actor: String,

    /// Joined into the `X-Oko-Capabilities` header
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_actor() -> String {
    "frontend-local".to_string()
}

fn default_capabilities() -> Vec<String> {
    [
        "read.state",
        "read.config",
        "read.config.revisions",
        "write.config.import",
        "write.config.patch",
        "write.config.rollback",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            actor: default_actor(),
            capabilities: default_capabilities(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Header value for `X-Oko-Capabilities`; falls back to the defaults when
    /// every configured entry is blank
    pub fn capabilities_header(&self) -> String {
        let configured: Vec<&str> = self
            .capabilities
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        if configured.is_empty() {
            default_capabilities().join(",")
        } else {
            configured.join(",")
        }
    }

    /// Header value for `X-Oko-Actor`
    pub fn actor_header(&self) -> String {
        let actor = self.actor.trim();
        if actor.is_empty() {
            default_actor()
        } else {
            actor.to_string()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Mutation orchestrator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// How long the "saved" status lingers before returning to idle
    #[serde(default = "default_save_status_reset")]
    pub save_status_reset_ms: u64,
}

fn default_save_status_reset() -> u64 {
    1400
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            save_status_reset_ms: default_save_status_reset(),
        }
    }
}

impl StoreConfig {
    pub fn save_status_reset(&self) -> Duration {
        Duration::from_millis(self.save_status_reset_ms)
    }
}

/// Persisted UI state configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UiStateConfig {
    /// Directory holding the key-value blobs
    #[serde(default = "default_ui_state_dir")]
    pub dir: String,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_ui_state_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("oko").join("ui-state").to_string_lossy().to_string())
        .unwrap_or_else(|| "./oko_ui_state".to_string())
}

fn default_storage_key() -> String {
    crate::ui_state::UI_STATE_STORAGE_KEY.to_string()
}

impl Default for UiStateConfig {
    fn default() -> Self {
        Self {
            dir: default_ui_state_dir(),
            storage_key: default_storage_key(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("oko").join("config.toml")),
            Some(PathBuf::from("/etc/oko/config.toml")),
            Some(PathBuf::from("./oko.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Remote overrides
        if let Some(base_url) = var("OKO_API_BASE") {
            self.remote.base_url = base_url;
        }
        if let Some(actor) = var("OKO_ACTOR") {
            self.remote.actor = actor;
        }
        if let Some(capabilities) = var("OKO_CAPABILITIES") {
            self.remote.capabilities = capabilities
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }

        if let Some(dir) = var("OKO_UI_STATE_DIR") {
            self.ui_state.dir = dir;
        }

        // Logging overrides
        if let Some(level) = var("OKO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("OKO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Oko Dashboard Configuration
#
# Environment variables override these settings:
# - OKO_API_BASE
# - OKO_ACTOR
# - OKO_CAPABILITIES (comma separated)
# - OKO_UI_STATE_DIR
# - OKO_LOG_LEVEL
# - OKO_LOG_FORMAT

[remote]
# Oko backend URL
base_url = "http://localhost:8000"

# Actor sent in the X-Oko-Actor header
actor = "frontend-local"

# Capabilities sent in the X-Oko-Capabilities header
capabilities = [
    "read.state",
    "read.config",
    "read.config.revisions",
    "write.config.import",
    "write.config.patch",
    "write.config.rollback",
]

# Request timeout in seconds
request_timeout_secs = 15

[store]
# How long the "saved" indicator stays before returning to idle (ms)
save_status_reset_ms = 1400

[ui_state]
# Directory for persisted UI state (active page, expanded groups, filter)
dir = "~/.local/share/oko/ui-state"

# Storage key of the per-route UI state blob
storage_key = "oko:dashboard-ui-state:v1"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/oko/dashboard.log"
"#
    .to_string()
}
