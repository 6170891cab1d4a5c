//! Application configuration for LeadLens.
//!
//! User config lives at `~/.leadlens/leadlens.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LeadLensError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadlens.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadlens";

// ---------------------------------------------------------------------------
// Config structs (matching leadlens.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Enrichment API settings.
    #[serde(default)]
    pub enrichment: EnrichmentApiConfig,

    /// Content-generation API settings.
    #[serde(default)]
    pub generation: GenerationApiConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory for durable state (analyses, knowledge snapshot, uploads).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// How long a job stays in primary in-memory storage, in seconds.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Target chunk size in characters for knowledge ingestion.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Default result cap for knowledge search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            retention_secs: default_retention_secs(),
            chunk_size: default_chunk_size(),
            search_limit: default_search_limit(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.leadlens/data".into()
}
fn default_retention_secs() -> u64 {
    3600
}
fn default_chunk_size() -> usize {
    800
}
fn default_search_limit() -> usize {
    10
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentApiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_enrichment_key_env")]
    pub api_key_env: String,

    /// Base URL of the enrichment API.
    #[serde(default = "default_enrichment_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,
}

impl Default for EnrichmentApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_enrichment_key_env(),
            base_url: default_enrichment_base_url(),
            timeout_secs: default_enrichment_timeout(),
        }
    }
}

fn default_enrichment_key_env() -> String {
    "PROXYCURL_API_KEY".into()
}
fn default_enrichment_base_url() -> String {
    "https://nubela.co/proxycurl/api".into()
}
fn default_enrichment_timeout() -> u64 {
    30
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationApiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_generation_key_env")]
    pub api_key_env: String,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model to use for summaries and outreach.
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_generation_key_env(),
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_generation_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_generation_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_generation_model() -> String {
    "gpt-4o-mini".into()
}
fn default_generation_timeout() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadlens/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadLensError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadlens/leadlens.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| LeadLensError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LeadLensError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadLensError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadLensError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadLensError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the configured data directory, expanding a leading `~`.
pub fn data_dir(config: &AppConfig) -> Result<PathBuf> {
    let raw = &config.defaults.data_dir;
    if let Some(rest) = raw.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| LeadLensError::config("could not determine home directory"))?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(raw))
    }
}

/// Read an API key from the named env var. Returns `None` if unset or empty.
pub fn api_key_from_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

/// Check that the content-generation API key is configured.
///
/// The enrichment client has a keyless sample mode, the generation client
/// does not — so only the generation key is a hard requirement for `analyze`.
pub fn require_generation_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.generation.api_key_env;
    api_key_from_env(var_name).ok_or_else(|| {
        LeadLensError::config(format!(
            "content-generation API key not found. Set the {var_name} environment variable."
        ))
    })
}
