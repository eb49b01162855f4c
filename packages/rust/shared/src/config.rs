//! Application configuration for inkpress.
//!
//! User config lives at `~/.inkpress/inkpress.toml`.
//! CLI flags override config file values, which override defaults.
//! The loaded [`AppConfig`] is turned into an immutable [`PipelineConfig`]
//! once and handed to the orchestrator; nothing reads settings globally.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{InkpressError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "inkpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".inkpress";

// ---------------------------------------------------------------------------
// Config structs (matching inkpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metadata and content constraints.
    #[serde(default)]
    pub content: ContentConfig,

    /// Image relocation settings.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Link health check settings.
    #[serde(default)]
    pub links: LinksConfig,
}

/// `[content]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Language assigned when the frontmatter has none or an unsupported one.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Primary language subtags accepted as-is.
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    /// Minimum body length (characters, after trimming).
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    #[serde(default = "default_max_subtitle_length")]
    pub max_subtitle_length: usize,

    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            supported_languages: default_supported_languages(),
            min_content_length: default_min_content_length(),
            max_title_length: default_max_title_length(),
            max_subtitle_length: default_max_subtitle_length(),
            max_tags: default_max_tags(),
        }
    }
}

fn default_language() -> String {
    "en".into()
}
fn default_supported_languages() -> Vec<String> {
    vec!["en".into()]
}
fn default_min_content_length() -> usize {
    50
}
fn default_max_title_length() -> usize {
    100
}
fn default_max_subtitle_length() -> usize {
    200
}
fn default_max_tags() -> usize {
    5
}

/// `[images]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Hosting endpoint that accepts multipart uploads. Relocation is
    /// disabled while this is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,

    /// Maximum number of images resolved/uploaded at the same time.
    #[serde(default = "default_image_concurrency")]
    pub max_concurrent: usize,

    /// Timeout for each remote image fetch and each upload.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            upload_url: None,
            max_concurrent: default_image_concurrency(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_image_concurrency() -> usize {
    8
}
fn default_fetch_timeout() -> u64 {
    30
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Per-probe timeout. Probes are never retried.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Maximum number of link probes in flight.
    #[serde(default = "default_link_concurrency")]
    pub max_concurrent: usize,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout(),
            max_concurrent: default_link_concurrency(),
        }
    }
}

fn default_probe_timeout() -> u64 {
    5
}
fn default_link_concurrency() -> usize {
    16
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime image relocation settings.
#[derive(Debug, Clone)]
pub struct RelocationConfig {
    /// Parsed hosting destination; `None` disables relocation.
    pub upload_url: Option<Url>,
    pub max_concurrent: usize,
    pub fetch_timeout: Duration,
}

/// Runtime link check settings.
#[derive(Debug, Clone)]
pub struct LinkCheckConfig {
    pub probe_timeout: Duration,
    pub max_concurrent: usize,
}

/// Immutable configuration for one orchestrator, built once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub content: ContentConfig,
    pub images: RelocationConfig,
    pub links: LinkCheckConfig,
}

impl TryFrom<&AppConfig> for PipelineConfig {
    type Error = InkpressError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let upload_url = config
            .images
            .upload_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_upload_url)
            .transpose()?;

        let content = config.content.clone();
        if !content.supported_languages.contains(&content.default_language) {
            return Err(InkpressError::config(format!(
                "default_language '{}' is not in supported_languages",
                content.default_language
            )));
        }

        Ok(Self {
            content,
            images: RelocationConfig {
                upload_url,
                max_concurrent: config.images.max_concurrent.max(1),
                fetch_timeout: Duration::from_secs(config.images.fetch_timeout_secs),
            },
            links: LinkCheckConfig {
                probe_timeout: Duration::from_secs(config.links.probe_timeout_secs),
                max_concurrent: config.links.max_concurrent.max(1),
            },
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            content: ContentConfig::default(),
            images: RelocationConfig {
                upload_url: None,
                max_concurrent: default_image_concurrency(),
                fetch_timeout: Duration::from_secs(default_fetch_timeout()),
            },
            links: LinkCheckConfig {
                probe_timeout: Duration::from_secs(default_probe_timeout()),
                max_concurrent: default_link_concurrency(),
            },
        }
    }
}

impl PipelineConfig {
    /// Override the hosting destination (e.g. from a CLI flag).
    pub fn with_upload_url(mut self, upload_url: Option<Url>) -> Self {
        if upload_url.is_some() {
            self.images.upload_url = upload_url;
        }
        self
    }
}

/// Parse and check an upload endpoint URL.
pub fn parse_upload_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| InkpressError::config(format!("invalid upload_url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(InkpressError::config(format!(
            "upload_url must be http or https, got '{other}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.inkpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InkpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.inkpress/inkpress.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| InkpressError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| InkpressError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InkpressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| InkpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| InkpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
