//! Application configuration for Volare.
//!
//! User config lives at `~/.volare/volare.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolareError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "volare.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".volare";

// ---------------------------------------------------------------------------
// Config structs (matching volare.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// CMS connection settings.
    #[serde(default)]
    pub cms: CmsConfig,

    /// Generative text service settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Source window for recent stories.
    #[serde(default)]
    pub article: ArticleConfig,

    /// Site identity used in metadata and the post footer.
    #[serde(default)]
    pub site: SiteConfig,
}

/// `[cms]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Base URL of the WordPress site (no trailing slash required).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the `X-API-Key` value (never store the key itself).
    #[serde(default = "default_cms_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_cms_timeout")]
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_cms_key_env(),
            timeout_secs: default_cms_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://volarereads.com".into()
}
fn default_cms_key_env() -> String {
    "VOLARE_CMS_API_KEY".into()
}
fn default_cms_timeout() -> u64 {
    30
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,

    /// Model used for article drafting.
    #[serde(default = "default_model")]
    pub model: String,

    /// API origin; overridable for local mocks.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_key_env(),
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_gemini_timeout() -> u64 {
    60
}

/// `[article]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleConfig {
    /// Trailing window, in days, that counts as "recent".
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Maximum number of stories requested from the CMS.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            per_page: default_per_page(),
        }
    }
}

fn default_window_days() -> u32 {
    7
}
fn default_per_page() -> u32 {
    20
}

/// `[site]` section: fixed identity fields for schema markup and the footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub url: String,
    #[serde(default = "default_logo_url")]
    pub logo_url: String,
    /// Link target for "full novel library" in the footer.
    #[serde(default = "default_library_url")]
    pub library_url: String,
    /// Link target for the community invite in the footer.
    #[serde(default = "default_community_url")]
    pub community_url: String,
    /// Genre attached to every referenced book in the metadata.
    #[serde(default = "default_genre")]
    pub genre: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            url: default_base_url(),
            logo_url: default_logo_url(),
            library_url: default_library_url(),
            community_url: default_community_url(),
            genre: default_genre(),
        }
    }
}

fn default_site_name() -> String {
    "Volarereads".into()
}
fn default_logo_url() -> String {
    "https://volarereads.com/wp-content/uploads/logo.png".into()
}
fn default_library_url() -> String {
    "https://volarereads.com/stories/".into()
}
fn default_community_url() -> String {
    "#".into()
}
fn default_genre() -> String {
    "Boys' Love".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.volare/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| VolareError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.volare/volare.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| VolareError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        VolareError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    url::Url::parse(&config.cms.base_url).map_err(|e| {
        VolareError::config(format!("invalid cms.base_url '{}': {e}", config.cms.base_url))
    })?;

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_dir()?)
}

/// Write a default config file into `dir`, creating the directory if needed.
pub fn init_config_at(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| VolareError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| VolareError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| VolareError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key from the named environment variable.
///
/// Missing and empty values are both rejected.
pub fn resolve_api_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(VolareError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}
