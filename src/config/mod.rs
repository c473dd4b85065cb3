//! Server configuration
//!
//! Configuration is assembled once at startup and never changes afterwards.
//! Sources, lowest to highest precedence:
//!
//! 1. Built-in defaults (production base URL, no request timeout)
//! 2. An optional TOML file (`--config` / `HITL_CONFIG`)
//! 3. Environment variables (`AGENTMP_BASE_URL`, `HITL_REQUEST_TIMEOUT_SECS`)
//!
//! The API key is a secret and is only ever read from `AGENTMP_API_KEY`.
//!
//! ```toml
//! [service]
//! base_url = "https://staging.agentmp.io"
//! request_timeout = 30
//!
//! [server]
//! name = "hitl-mcp-server"
//! ```

use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

use crate::mcp::server::MCPServerConfig;
use crate::utils::logging::obscure_credential;

/// Environment variable holding the escalation service credential
pub const API_KEY_ENV: &str = "AGENTMP_API_KEY";
/// Environment variable overriding the service base URL
pub const BASE_URL_ENV: &str = "AGENTMP_BASE_URL";
/// Environment variable setting an outbound request timeout in seconds
pub const REQUEST_TIMEOUT_ENV: &str = "HITL_REQUEST_TIMEOUT_SECS";
/// Environment variable pointing at a TOML config file
pub const CONFIG_PATH_ENV: &str = "HITL_CONFIG";

/// Production escalation service
pub const DEFAULT_BASE_URL: &str = "https://backend.agentmp.io";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} environment variable is required")]
    MissingCredential { var: &'static str },
    #[error("Environment variable parsing error: {0}")]
    EnvVarParse(String),
    #[error("File parsing error: {0}")]
    FileParse(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The escalation service credential
///
/// Formatting never reveals more than the first five characters.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for placing on the wire
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey")
            .field(&obscure_credential(&self.0))
            .finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&obscure_credential(&self.0))
    }
}

/// Remote escalation service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Base URL every API path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Outbound request timeout; `None` keeps the HTTP client default
    #[serde(with = "duration_seconds_opt", default)]
    pub request_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: None,
        }
    }
}

/// How the server identifies itself during the MCP handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerInfoConfig {
    #[serde(default = "default_server_name")]
    pub name: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl Default for ServerInfoConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            instructions: None,
        }
    }
}

/// File-backed portion of the configuration (everything except the secret)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: ServerInfoConfig,
}

impl FileConfig {
    /// Load the TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::FileParse(format!("{}: {}", path.display(), e)))
    }
}

/// Complete, immutable server configuration
#[derive(Debug, Clone)]
pub struct HitlConfig {
    pub api_key: ApiKey,
    pub service: ServiceConfig,
    pub server: ServerInfoConfig,
}

impl HitlConfig {
    /// Configuration with defaults and the given credential
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: ApiKey::new(api_key),
            service: ServiceConfig::default(),
            server: ServerInfoConfig::default(),
        }
    }

    /// Point the adapter at a different service root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.service.base_url = base_url.into();
        self
    }

    /// Set an outbound request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.service.request_timeout = Some(timeout);
        self
    }

    /// Load configuration from the process environment
    ///
    /// `config_path` takes precedence over `HITL_CONFIG` when both are set.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_lookup(config_path, |key| env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the environment
    pub fn from_lookup<F>(config_path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(ApiKey::new)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential { var: API_KEY_ENV })?;

        let file_path = config_path
            .map(Path::to_path_buf)
            .or_else(|| lookup(CONFIG_PATH_ENV).map(PathBuf::from));
        let file = match file_path {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        let mut config = Self {
            api_key,
            service: file.service,
            server: file.server,
        };

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.service.base_url = base_url;
        }
        if let Some(timeout) = lookup(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = timeout.trim().parse().map_err(|e| {
                ConfigError::EnvVarParse(format!("{}: {}", REQUEST_TIMEOUT_ENV, e))
            })?;
            config.service.request_timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingCredential { var: API_KEY_ENV });
        }

        let url = Url::parse(&self.service.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid base URL '{}': {}",
                self.service.base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ConfigError::Validation(format!(
                "Base URL '{}' cannot carry a path",
                self.service.base_url
            )));
        }

        if matches!(self.service.request_timeout, Some(t) if t.is_zero()) {
            return Err(ConfigError::Validation(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Server name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Handshake identity for the MCP layer
    pub fn mcp_server_config(&self) -> MCPServerConfig {
        MCPServerConfig {
            name: self.server.name.clone(),
            instructions: self.server.instructions.clone(),
            ..MCPServerConfig::default()
        }
    }
}

/// Custom serialization for optional Duration as seconds
mod duration_seconds_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_server_name() -> String {
    "hitl-mcp-server".to_string()
}
