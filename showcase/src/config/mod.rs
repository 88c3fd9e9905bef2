//! Site configuration loading.
//!
//! This module parses the `site.toml` file that drives all three subcommands:
//! the owner whose repositories are listed, the hosted-URL override table,
//! filesystem paths, the featured-repo policy, and headless browser settings.

mod error;

pub use error::ConfigError;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level site configuration parsed from `site.toml`.
///
/// Only `owner` is required; everything else has sensible defaults.
///
/// ```toml
/// owner = "owleggsbot"
///
/// [hosted_overrides]
/// clawcities = "https://clawcities.com/sites/owleggs"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// GitHub login whose public repositories are rendered.
    pub owner: String,

    /// Repos with a non-standard hosted URL, keyed by repo name.
    ///
    /// An entry here always wins over the repo's Pages URL and homepage.
    #[serde(default)]
    pub hosted_overrides: BTreeMap<String, String>,

    /// Filesystem layout of the generated site.
    #[serde(default)]
    pub paths: Paths,

    /// Policy for the featured-repo heuristic.
    #[serde(default)]
    pub featured: FeaturedPolicy,

    /// Headless browser settings for screenshot capture.
    #[serde(default)]
    pub browser: BrowserConfig,
}

impl SiteConfig {
    /// Loads and validates the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid TOML,
    /// or fails validation (empty owner).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        if config.owner.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                message: "owner must not be empty".to_string(),
            });
        }

        debug!(owner = %config.owner, overrides = config.hosted_overrides.len(), "Loaded site config");
        Ok(config)
    }
}

/// Filesystem layout of the site, rooted at a single directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Directory holding the site: entry point, snapshot, and screenshots.
    pub root: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Paths {
    /// Path to the cached snapshot file.
    pub fn snapshot(&self) -> PathBuf {
        self.root.join("repos.json")
    }

    /// Directory holding captured screenshots.
    pub fn shots_dir(&self) -> PathBuf {
        self.root.join("assets").join("shots")
    }

    /// Path to the HTML entry point.
    pub fn index_html(&self) -> PathBuf {
        self.root.join("index.html")
    }

    /// Path to the generated stylesheet.
    pub fn styles_css(&self) -> PathBuf {
        self.root.join("styles.css")
    }

    /// Path to the generated client script.
    pub fn site_js(&self) -> PathBuf {
        self.root.join("site.js")
    }
}

/// Policy knobs for the featured-repo heuristic.
///
/// The heuristic itself (stars, ties broken by push recency) is fixed; only
/// the size of the featured set is configurable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeaturedPolicy {
    /// Maximum number of featured repos.
    pub max: usize,
}

impl Default for FeaturedPolicy {
    fn default() -> Self {
        Self { max: 9 }
    }
}

/// Headless browser settings for screenshot capture.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Per-page navigation timeout in seconds.
    pub timeout_secs: u64,

    /// Virtual-time budget in milliseconds, letting late-loading content
    /// settle before the capture.
    pub settle_ms: u64,

    /// Viewport width in pixels.
    pub viewport_width: u32,

    /// Viewport height in pixels.
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 45,
            settle_ms: 5000,
            viewport_width: 1200,
            viewport_height: 630,
        }
    }
}
