//! Application configuration for Folio.
//!
//! User config lives at `~/.folio/folio.toml`.
//! CLI flags override environment variables, which override config file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FolioError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "folio.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".folio";

// ---------------------------------------------------------------------------
// Config structs (matching folio.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Content API connection settings.
    #[serde(default)]
    pub content: ContentSection,

    /// Catalog snapshot settings.
    #[serde(default)]
    pub catalog: CatalogSection,
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSection {
    /// Name of the env var holding the GraphQL endpoint.
    #[serde(default = "default_endpoint_env")]
    pub endpoint_env: String,

    /// Name of the env var holding the bearer token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Literal endpoint, used when the env var is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// HTTP request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            endpoint_env: default_endpoint_env(),
            token_env: default_token_env(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint_env() -> String {
    "HYGRAPH_ENDPOINT".into()
}
fn default_token_env() -> String {
    "HYGRAPH_TOKEN".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Seconds after which a fetched snapshot is considered stale.
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            revalidate_secs: default_revalidate_secs(),
        }
    }
}

fn default_revalidate_secs() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Content config (runtime, merged from config + env + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime content API configuration. Fixed once the client is built.
#[derive(Clone)]
pub struct ContentConfig {
    /// GraphQL endpoint.
    pub endpoint: Url,
    /// Optional bearer token; `None` means unauthenticated access.
    pub token: Option<String>,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ContentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ContentOverrides {
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

impl ContentConfig {
    /// Config for an endpoint with no token and the default timeout.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Resolve from the config file, process environment and CLI overrides.
    pub fn resolve(config: &AppConfig, overrides: &ContentOverrides) -> Result<Self> {
        Self::resolve_with(config, overrides, |name| std::env::var(name).ok())
    }

    /// Same as [`ContentConfig::resolve`] with an injectable env lookup.
    pub fn resolve_with(
        config: &AppConfig,
        overrides: &ContentOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let section = &config.content;

        let endpoint = non_blank(overrides.endpoint.clone())
            .or_else(|| non_blank(env(&section.endpoint_env)))
            .or_else(|| non_blank(section.endpoint.clone()))
            .ok_or_else(|| {
                FolioError::config(format!(
                    "no content endpoint configured. Set the {} environment variable \
                     or pass --endpoint.",
                    section.endpoint_env
                ))
            })?;

        let endpoint = Url::parse(&endpoint).map_err(|e| {
            FolioError::validation(format!("invalid endpoint '{endpoint}': {e}"))
        })?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(FolioError::validation(format!(
                "endpoint must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let token = non_blank(overrides.token.clone()).or_else(|| non_blank(env(&section.token_env)));

        Ok(Self {
            endpoint,
            token,
            timeout_secs: section.timeout_secs,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.folio/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| FolioError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.folio/folio.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FolioError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FolioError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FolioError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| FolioError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FolioError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
