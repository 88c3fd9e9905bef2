//! Screenshot capture batch.
//!
//! Walks the snapshot and captures a thumbnail for every repo that has a
//! site URL and no existing screenshot. This is the one place with explicit
//! partial-failure tolerance: a broken site is logged and skipped, and the
//! batch keeps going. Repos are processed strictly one at a time.

mod browser;

pub use browser::{CaptureError, HeadlessBrowser};

use crate::config::SiteConfig;
use crate::snapshot::{RepositorySummary, Snapshot, SnapshotError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

/// Errors that abort the whole capture batch.
#[derive(Debug, Error)]
pub enum ShotError {
    /// Snapshot could not be read.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// No headless browser available on PATH.
    #[error("No headless browser found on PATH (tried chromium, chrome, google-chrome, chromium-browser)")]
    NoBrowser,

    /// Filesystem error preparing the output directory.
    #[error("Failed to access '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What to do for a single repo in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Capture the site into `dest`.
    Capture { url: String, dest: PathBuf },
    /// Repo has no deployed site; nothing to capture.
    NoSiteUrl,
    /// A screenshot already exists; never overwritten.
    AlreadyCaptured,
    /// The recorded site URL does not parse; counts as a per-item failure.
    InvalidUrl,
}

/// Counters for a complete capture run.
#[derive(Debug, Clone, Default)]
pub struct CaptureSummary {
    /// New screenshots written.
    pub captured: usize,

    /// Repos skipped because a screenshot already existed.
    pub skipped_existing: usize,

    /// Repos without a site URL.
    pub no_site_url: usize,

    /// Per-repo capture failures (logged and skipped).
    pub failed: usize,
}

impl CaptureSummary {
    /// Returns true if any per-repo capture failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Decides what the batch should do for one repo.
///
/// Pure with respect to the snapshot contents; only consults the filesystem
/// for the existing-screenshot check that makes re-runs idempotent.
pub fn disposition(repo: &RepositorySummary, root: &Path) -> Disposition {
    let (Some(site_url), Some(shot_path)) = (&repo.site_url, &repo.screenshot_path) else {
        return Disposition::NoSiteUrl;
    };

    let dest = root.join(shot_path);
    if dest.exists() {
        return Disposition::AlreadyCaptured;
    }

    if Url::parse(site_url).is_err() {
        return Disposition::InvalidUrl;
    }

    Disposition::Capture {
        url: site_url.clone(),
        dest,
    }
}

/// Captures screenshots for every snapshot repo that needs one.
///
/// # Errors
///
/// Returns [`ShotError`] only for batch-level failures: an unreadable
/// snapshot, a missing browser, or an unwritable output directory.
/// Individual captures that fail are recorded in the summary instead.
pub async fn capture_shots(config: &SiteConfig) -> Result<CaptureSummary, ShotError> {
    let span = info_span!("capture_shots", owner = %config.owner);

    async {
        let snapshot = Snapshot::load(&config.paths.snapshot())?;

        let shots_dir = config.paths.shots_dir();
        std::fs::create_dir_all(&shots_dir).map_err(|e| ShotError::IoError {
            path: shots_dir.display().to_string(),
            source: e,
        })?;

        let browser = HeadlessBrowser::detect().ok_or(ShotError::NoBrowser)?;
        info!(browser = browser.binary(), repos = snapshot.repos.len(), "Starting capture batch");

        let mut summary = CaptureSummary::default();
        for repo in &snapshot.repos {
            match disposition(repo, &config.paths.root) {
                Disposition::NoSiteUrl => {
                    summary.no_site_url += 1;
                }
                Disposition::AlreadyCaptured => {
                    debug!(repo = %repo.name, "Screenshot already exists, skipping");
                    summary.skipped_existing += 1;
                }
                Disposition::InvalidUrl => {
                    warn!(
                        repo = %repo.name,
                        url = %repo.site_url.as_deref().unwrap_or_default(),
                        "Site URL does not parse, skipping"
                    );
                    summary.failed += 1;
                }
                Disposition::Capture { url, dest } => {
                    if let Some(parent) = dest.parent() {
                        std::fs::create_dir_all(parent).map_err(|e| ShotError::IoError {
                            path: parent.display().to_string(),
                            source: e,
                        })?;
                    }

                    match browser.capture(&url, &dest, &config.browser).await {
                        Ok(()) => {
                            info!(repo = %repo.name, path = %dest.display(), "Captured screenshot");
                            summary.captured += 1;
                        }
                        Err(e) => {
                            // One broken site must not abort the batch.
                            warn!(repo = %repo.name, url = %url, error = %e, "Capture failed");
                            summary.failed += 1;
                        }
                    }
                }
            }
        }

        info!(
            captured = summary.captured,
            skipped = summary.skipped_existing,
            no_site = summary.no_site_url,
            failed = summary.failed,
            "Capture batch complete"
        );
        Ok(summary)
    }
    .instrument(span)
    .await
}
