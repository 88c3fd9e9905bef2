//! Cached repository snapshot.
//!
//! The snapshot (`repos.json`) is produced by the cache updater and consumed
//! read-only by the renderer and the screenshot capturer. It holds one
//! [`RepositorySummary`] per public, non-forked repository, plus derived
//! fields: the hosted URL (manual override table), the GitHub Pages URL
//! (naming convention), the site URL (best-available live URL), and the
//! screenshot path.

use crate::config::SiteConfig;
use crate::github::GithubRepo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Failed to read or write the snapshot file.
    #[error("Failed to access snapshot '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or serialize snapshot JSON.
    #[error("Invalid snapshot JSON in '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single repository as stored in the snapshot.
///
/// Field names match the JSON contract; `description` and `homepage` are
/// empty strings (not null) when the repo has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: String,
    pub homepage: String,
    pub has_pages: bool,
    pub is_template: bool,
    pub archived: bool,
    pub disabled: bool,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub license: Option<LicenseSummary>,

    // Derived fields.
    pub hosted_url: Option<String>,
    pub pages_url: Option<String>,
    pub site_url: Option<String>,
    pub screenshot_path: Option<String>,
}

impl RepositorySummary {
    /// Returns the trimmed description, or `None` when it is missing.
    pub fn description_text(&self) -> Option<&str> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Returns the homepage when it is a non-empty URL.
    pub fn homepage_url(&self) -> Option<&str> {
        let trimmed = self.homepage.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// License fields carried into the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseSummary {
    pub key: Option<String>,
    pub name: Option<String>,
    pub spdx_id: Option<String>,
}

/// The snapshot file: repositories plus generation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub owner: String,
    pub repos: Vec<RepositorySummary>,
    pub missing_descriptions: Vec<String>,
}

impl Snapshot {
    /// Assembles a snapshot from already-summarized repositories.
    ///
    /// `missing_descriptions` is computed from the repos so the site can nudge
    /// the owner about cards that render with a placeholder.
    pub fn new(owner: &str, repos: Vec<RepositorySummary>) -> Self {
        let missing_descriptions = repos
            .iter()
            .filter(|r| r.description_text().is_none())
            .map(|r| r.name.clone())
            .collect();

        Self {
            generated_at: Utc::now(),
            owner: owner.to_string(),
            repos,
            missing_descriptions,
        }
    }

    /// Loads a snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the file is missing, unreadable, or not
    /// valid snapshot JSON.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let snapshot = serde_json::from_str(&content).map_err(|e| SnapshotError::JsonError {
            path: path.display().to_string(),
            source: e,
        })?;

        debug!(path = %path.display(), "Loaded snapshot");
        Ok(snapshot)
    }

    /// Writes the snapshot as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| SnapshotError::JsonError {
                path: path.display().to_string(),
                source: e,
            })?;
        json.push('\n');

        std::fs::write(path, json).map_err(|e| SnapshotError::IoError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// Computes the conventional GitHub Pages URL for a repository.
///
/// The user-site repo (`<owner>.github.io`, compared case-insensitively) is
/// served from the bare domain; every other repo gets a sub-path.
pub fn pages_url_for(owner: &str, repo_name: &str) -> String {
    let user_site = format!("{owner}.github.io").to_lowercase();
    if repo_name.to_lowercase() == user_site {
        format!("https://{owner}.github.io/")
    } else {
        format!("https://{owner}.github.io/{repo_name}/")
    }
}

/// Maps a raw API repository to its snapshot summary.
///
/// Derivation order for the site URL: hosted override, then Pages URL, then a
/// non-empty homepage. The screenshot path exists exactly when a site URL
/// does.
pub fn summarize(repo: &GithubRepo, config: &SiteConfig) -> RepositorySummary {
    let hosted_url = config.hosted_overrides.get(&repo.name).cloned();
    let pages_url = repo
        .has_pages
        .then(|| pages_url_for(&config.owner, &repo.name));
    let homepage = repo.homepage.clone().unwrap_or_default();
    let homepage_url = {
        let trimmed = homepage.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };

    let site_url = hosted_url
        .clone()
        .or_else(|| pages_url.clone())
        .or(homepage_url);

    let screenshot_path = site_url
        .is_some()
        .then(|| format!("assets/shots/{}.jpg", repo.name));

    RepositorySummary {
        id: repo.id,
        name: repo.name.clone(),
        full_name: repo.full_name.clone(),
        html_url: repo.html_url.clone(),
        description: repo.description.clone().unwrap_or_default(),
        homepage,
        has_pages: repo.has_pages,
        is_template: repo.is_template,
        archived: repo.archived,
        disabled: repo.disabled,
        pushed_at: repo.pushed_at,
        updated_at: repo.updated_at,
        created_at: repo.created_at,
        language: repo.language.clone(),
        topics: repo.topics.clone(),
        stargazers_count: repo.stargazers_count,
        forks_count: repo.forks_count,
        open_issues_count: repo.open_issues_count,
        license: repo.license.as_ref().map(|l| LicenseSummary {
            key: l.key.clone(),
            name: l.name.clone(),
            spdx_id: l.spdx_id.clone(),
        }),
        hosted_url,
        pages_url,
        site_url,
        screenshot_path,
    }
}

/// Summarizes a listing, dropping private and forked repositories.
pub fn summarize_public(repos: &[GithubRepo], config: &SiteConfig) -> Vec<RepositorySummary> {
    repos
        .iter()
        .filter(|r| !r.private && !r.fork)
        .map(|r| summarize(r, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn test_config(owner: &str) -> SiteConfig {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "clawcities".to_string(),
            "https://clawcities.com/sites/octocat".to_string(),
        );
        SiteConfig {
            owner: owner.to_string(),
            hosted_overrides: overrides,
            paths: Default::default(),
            featured: Default::default(),
            browser: Default::default(),
        }
    }

    fn raw_repo(name: &str) -> GithubRepo {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": name,
            "full_name": format!("octocat/{name}"),
            "html_url": format!("https://github.com/octocat/{name}"),
        }))
        .unwrap()
    }

    #[test]
    fn pages_url_uses_naming_convention() {
        assert_eq!(
            pages_url_for("octocat", "widget"),
            "https://octocat.github.io/widget/"
        );
    }

    #[test]
    fn pages_url_special_cases_user_site() {
        assert_eq!(
            pages_url_for("octocat", "octocat.github.io"),
            "https://octocat.github.io/"
        );
        // Comparison is case-insensitive.
        assert_eq!(
            pages_url_for("octocat", "Octocat.GitHub.IO"),
            "https://octocat.github.io/"
        );
    }

    #[test]
    fn override_wins_over_homepage_and_pages() {
        let mut repo = raw_repo("clawcities");
        repo.homepage = Some("https://elsewhere.example.com".to_string());
        repo.has_pages = true;

        let summary = summarize(&repo, &test_config("octocat"));

        assert_eq!(
            summary.hosted_url.as_deref(),
            Some("https://clawcities.com/sites/octocat")
        );
        assert_eq!(
            summary.site_url.as_deref(),
            Some("https://clawcities.com/sites/octocat")
        );
    }

    #[test]
    fn site_url_falls_back_to_pages_then_homepage() {
        let mut repo = raw_repo("widget");
        repo.has_pages = true;
        repo.homepage = Some("https://widget.example.com".to_string());

        let summary = summarize(&repo, &test_config("octocat"));
        assert_eq!(
            summary.site_url.as_deref(),
            Some("https://octocat.github.io/widget/")
        );

        let mut repo = raw_repo("widget");
        repo.homepage = Some("  https://widget.example.com  ".to_string());
        let summary = summarize(&repo, &test_config("octocat"));
        assert_eq!(
            summary.site_url.as_deref(),
            Some("https://widget.example.com")
        );
    }

    #[test]
    fn blank_homepage_yields_no_site_url() {
        let mut repo = raw_repo("quiet");
        repo.homepage = Some("   ".to_string());

        let summary = summarize(&repo, &test_config("octocat"));

        assert!(summary.site_url.is_none());
        assert!(summary.screenshot_path.is_none());
    }

    #[test]
    fn screenshot_path_follows_site_url() {
        let mut repo = raw_repo("widget");
        repo.has_pages = true;

        let summary = summarize(&repo, &test_config("octocat"));

        assert_eq!(
            summary.screenshot_path.as_deref(),
            Some("assets/shots/widget.jpg")
        );
    }

    #[test]
    fn summarize_public_drops_private_and_forks() {
        let mut private = raw_repo("secret");
        private.private = true;
        let mut fork = raw_repo("upstream-fork");
        fork.fork = true;
        let public = raw_repo("widget");

        let summaries = summarize_public(&[private, fork, public], &test_config("octocat"));

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "widget");
    }

    #[test]
    fn snapshot_records_missing_descriptions() {
        let config = test_config("octocat");
        let mut described = raw_repo("widget");
        described.description = Some("A widget".to_string());
        let bare = raw_repo("bare");
        let mut blank = raw_repo("blank");
        blank.description = Some("   ".to_string());

        let snapshot = Snapshot::new(
            "octocat",
            summarize_public(&[described, bare, blank], &config),
        );

        assert_eq!(snapshot.missing_descriptions, vec!["bare", "blank"]);
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("repos.json");
        let config = test_config("octocat");
        let snapshot = Snapshot::new("octocat", summarize_public(&[raw_repo("widget")], &config));

        snapshot.write(&path).unwrap();
        let loaded = Snapshot::load(&path).unwrap();

        assert_eq!(loaded.owner, "octocat");
        assert_eq!(loaded.repos.len(), 1);
        assert_eq!(loaded.repos[0].name, "widget");
        // Pretty-printed with a trailing newline.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with("}\n"));
    }
}
