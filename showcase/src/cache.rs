//! Cache update orchestration.
//!
//! Fetches the repository listing, writes the snapshot, and patches the
//! asset version markers in the HTML entry point so browsers pick up fresh
//! static assets. Any failure here aborts the run; there is no retry.

use crate::config::SiteConfig;
use crate::github::{self, FetchError};
use crate::snapshot::{summarize_public, Snapshot, SnapshotError};
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};

static STYLES_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(styles\.css\?v=)\d+").expect("static pattern"));
static SCRIPT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(site\.js\?v=)\d+").expect("static pattern"));

/// Errors that can occur during a cache update.
#[derive(Debug, Error)]
pub enum CacheError {
    /// GitHub API error.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Snapshot read/write error.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Filesystem error outside the snapshot itself.
    #[error("Failed to access '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a cache update.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Number of repositories written to the snapshot.
    pub repo_count: usize,

    /// Names of repos whose cards will render with a description placeholder.
    pub missing_descriptions: Vec<String>,

    /// Asset version stamp patched into the entry point.
    pub asset_version: String,
}

/// Formats a timestamp as the compact `YYYYMMDDHHMMSS` asset version stamp.
pub fn asset_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Refreshes the snapshot and bumps the entry point's asset versions.
///
/// # Errors
///
/// Returns [`CacheError`] on any network or file error. Per the batch
/// contract there is no partial tolerance here: a failed update leaves the
/// previous snapshot in place.
pub async fn update_cache(
    octocrab: &Octocrab,
    config: &SiteConfig,
) -> Result<UpdateReport, CacheError> {
    let span = info_span!("update_cache", owner = %config.owner);

    async {
        std::fs::create_dir_all(config.paths.shots_dir()).map_err(|e| CacheError::IoError {
            path: config.paths.shots_dir().display().to_string(),
            source: e,
        })?;

        let listing = github::list_repositories(octocrab, &config.owner).await?;
        let repos = summarize_public(&listing, config);
        let snapshot = Snapshot::new(&config.owner, repos);

        if !snapshot.missing_descriptions.is_empty() {
            warn!(
                count = snapshot.missing_descriptions.len(),
                repos = %snapshot.missing_descriptions.join(", "),
                "Repos missing description"
            );
        }

        let snapshot_path = config.paths.snapshot();
        snapshot.write(&snapshot_path)?;
        info!(
            path = %snapshot_path.display(),
            count = snapshot.repos.len(),
            "Wrote snapshot"
        );

        let asset_version = bump_asset_version(&config.paths.index_html())?;

        Ok(UpdateReport {
            repo_count: snapshot.repos.len(),
            missing_descriptions: snapshot.missing_descriptions,
            asset_version,
        })
    }
    .instrument(span)
    .await
}

/// Patches both asset version markers in the entry point, returning the stamp.
///
/// # Errors
///
/// Returns [`CacheError::IoError`] if the entry point cannot be read or
/// written; a missing entry point is a hard failure, matching the rest of
/// the batch.
pub fn bump_asset_version(index_html: &Path) -> Result<String, CacheError> {
    let html = std::fs::read_to_string(index_html).map_err(|e| CacheError::IoError {
        path: index_html.display().to_string(),
        source: e,
    })?;

    let stamp = asset_stamp(Utc::now());
    let patched = patch_asset_markers(&html, &stamp);

    std::fs::write(index_html, patched).map_err(|e| CacheError::IoError {
        path: index_html.display().to_string(),
        source: e,
    })?;

    info!(stamp = %stamp, path = %index_html.display(), "Bumped asset cache busters");
    Ok(stamp)
}

/// Rewrites the two version query parameters to `stamp`.
fn patch_asset_markers(html: &str, stamp: &str) -> String {
    let replacement = format!("${{1}}{stamp}");
    let html = STYLES_MARKER.replace_all(html, replacement.as_str());
    SCRIPT_MARKER
        .replace_all(&html, replacement.as_str())
        .into_owned()
}
