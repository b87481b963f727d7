//! Application configuration structures.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::is_safe_file_name;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote endpoint, identifier range and worker pool settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Output layout
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging behaviour
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.scraper.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Pipeline settings: where to fetch from, what to fetch, how many workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Remote origin, e.g. `https://oral.planez.co`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// First identifier (inclusive)
    #[serde(default = "defaults::range_start")]
    pub range_start: u32,

    /// Last identifier (inclusive)
    #[serde(default = "defaults::range_end")]
    pub range_end: u32,

    /// Worker pool size
    #[serde(default = "defaults::worker_count")]
    pub worker_count: usize,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds. Unset means requests may wait forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ScraperConfig {
    /// Parse the configured base URL.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Number of identifiers in the configured range.
    pub fn id_count(&self) -> usize {
        if self.range_start > self.range_end {
            return 0;
        }
        (self.range_end - self.range_start) as usize + 1
    }

    fn validate(&self) -> Result<()> {
        let url = self
            .base_url()
            .map_err(|e| AppError::validation(format!("scraper.base_url is invalid: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(
                "scraper.base_url must use http or https",
            ));
        }
        if url.cannot_be_a_base() {
            return Err(AppError::validation("scraper.base_url cannot be a base URL"));
        }
        if self.range_start > self.range_end {
            return Err(AppError::validation(format!(
                "scraper.range_start ({}) is greater than scraper.range_end ({})",
                self.range_start, self.range_end
            )));
        }
        if self.worker_count == 0 {
            return Err(AppError::validation("scraper.worker_count must be > 0"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.timeout_secs == Some(0) {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            range_start: defaults::range_start(),
            range_end: defaults::range_end(),
            worker_count: defaults::worker_count(),
            user_agent: defaults::user_agent(),
            timeout_secs: None,
        }
    }
}

/// Output directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root output directory. Cleared at the start of every run.
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    /// Image subdirectory name under `data_dir`
    #[serde(default = "defaults::images_dir")]
    pub images_dir: String,

    /// Optional merged file holding every fetched question
    #[serde(default)]
    pub combined_file: Option<String>,

    /// Download images after the question pass
    #[serde(default = "defaults::download_images")]
    pub download_images: bool,
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::validation("output.data_dir is empty"));
        }
        // The directory is removed at the start of a run.
        if !self
            .data_dir
            .components()
            .any(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!(
                "output.data_dir {:?} does not name a directory that can be cleared",
                self.data_dir
            )));
        }
        if !is_safe_file_name(&self.images_dir) {
            return Err(AppError::validation(format!(
                "output.images_dir must be a single directory name, got {:?}",
                self.images_dir
            )));
        }
        if let Some(file) = &self.combined_file {
            if !is_safe_file_name(file) {
                return Err(AppError::validation(format!(
                    "output.combined_file must be a plain file name, got {file:?}"
                )));
            }
            if file == &self.images_dir {
                return Err(AppError::validation(
                    "output.combined_file collides with output.images_dir",
                ));
            }
            let stem = Path::new(file)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()) {
                return Err(AppError::validation(format!(
                    "output.combined_file {file:?} collides with per-question files"
                )));
            }
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            images_dir: defaults::images_dir(),
            combined_file: None,
            download_images: defaults::download_images(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Print the per-step banners and the final summary
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            show_progress: defaults::show_progress(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Scraper defaults
    pub fn base_url() -> String {
        "https://oral.planez.co".into()
    }
    pub fn range_start() -> u32 {
        1000
    }
    pub fn range_end() -> u32 {
        1305
    }
    pub fn worker_count() -> usize {
        4
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; question-scraper/0.1)".into()
    }

    // Output defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn images_dir() -> String {
        "images".into()
    }
    pub fn download_images() -> bool {
        true
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn show_progress() -> bool {
        true
    }
}
