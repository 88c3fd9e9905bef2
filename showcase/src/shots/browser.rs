//! Headless browser capture.
//!
//! Screenshots are taken by spawning a Chromium-family binary found on PATH
//! with `--headless --screenshot`, then transcoding the PNG it writes into
//! the JPEG thumbnail the site serves. One browser process runs at a time.

use crate::config::BrowserConfig;
use std::io::BufWriter;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Browser binaries to probe, in preference order.
const CANDIDATE_BROWSERS: &[&str] = &["chromium", "chrome", "google-chrome", "chromium-browser"];

/// JPEG quality for saved thumbnails.
const JPEG_QUALITY: u8 = 80;

/// Errors for a single capture attempt.
///
/// These are per-item failures: the batch logs them and moves on.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Browser process could not be started.
    #[error("Failed to start browser process: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    /// Navigation did not finish within the timeout.
    #[error("Browser did not produce output within {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Browser exited without writing a screenshot.
    #[error("Browser exited but produced no screenshot file")]
    NoOutput,

    /// PNG decode or JPEG encode failed.
    #[error("Failed to transcode screenshot: {source}")]
    Transcode {
        #[source]
        source: image::ImageError,
    },

    /// Filesystem error around the capture.
    #[error("Failed to access '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A headless browser binary resolved from PATH.
#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    binary: String,
}

impl HeadlessBrowser {
    /// Finds the first headless-capable browser binary on PATH.
    pub fn detect() -> Option<Self> {
        for candidate in CANDIDATE_BROWSERS {
            if on_path(candidate) {
                debug!(browser = *candidate, "Headless browser detected on PATH");
                return Some(Self {
                    binary: (*candidate).to_string(),
                });
            }
        }
        None
    }

    /// Returns the resolved binary name.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Captures `url` into a JPEG at `dest`.
    ///
    /// The browser writes a PNG into an isolated temp directory; the PNG is
    /// then transcoded to JPEG at the final path, so `dest` never holds a
    /// partial file.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] on spawn failure, timeout, missing output, or
    /// transcode failure.
    pub async fn capture(
        &self,
        url: &str,
        dest: &Path,
        config: &BrowserConfig,
    ) -> Result<(), CaptureError> {
        let tmp = TempDir::new().map_err(|e| CaptureError::IoError {
            path: "tempdir".to_string(),
            source: e,
        })?;
        let png_path = tmp.path().join("shot.png");

        let window_size = format!("{},{}", config.viewport_width, config.viewport_height);
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--hide-scrollbars")
            .arg(format!("--screenshot={}", png_path.display()))
            .arg(format!("--window-size={window_size}"))
            // Lets timers and late network loads run before the capture.
            .arg(format!("--virtual-time-budget={}", config.settle_ms))
            .arg(url)
            .current_dir(tmp.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        debug!(browser = %self.binary, url = %url, "Spawning headless browser");

        let mut child = cmd.spawn().map_err(|e| CaptureError::Spawn { source: e })?;

        match timeout(Duration::from_secs(config.timeout_secs), child.wait()).await {
            Err(_elapsed) => {
                // Kill the child to avoid zombie processes.
                let _ = child.kill().await;
                return Err(CaptureError::Timeout {
                    timeout_secs: config.timeout_secs,
                });
            }
            Ok(Err(e)) => return Err(CaptureError::Spawn { source: e }),
            Ok(Ok(status)) => {
                if !status.success() {
                    // A partial render may still have been written; fall
                    // through and check for output.
                    warn!(url = %url, status = ?status, "Browser exited with non-zero status");
                }
            }
        }

        if !png_path.exists() {
            return Err(CaptureError::NoOutput);
        }

        transcode_jpeg(&png_path, dest)
    }
}

/// Checks whether a binary is available on PATH.
fn on_path(binary: &str) -> bool {
    if let Ok(path_var) = std::env::var("PATH") {
        for dir in path_var.split(':') {
            if Path::new(dir).join(binary).is_file() {
                return true;
            }
        }
    }
    false
}

/// Transcodes the browser's PNG output into the final JPEG.
fn transcode_jpeg(src: &Path, dest: &Path) -> Result<(), CaptureError> {
    let img = image::open(src).map_err(|e| CaptureError::Transcode { source: e })?;
    let rgb = img.to_rgb8();

    let file = std::fs::File::create(dest).map_err(|e| CaptureError::IoError {
        path: dest.display().to_string(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| CaptureError::Transcode { source: e })
}
