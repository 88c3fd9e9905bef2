//! GitHub REST API access.
//!
//! Two endpoints are used: the user's repository listing (one page of up to
//! 100, sorted by push date) and the user profile. Both go through octocrab's
//! raw-route `get` so the response shape stays under our control.

use crate::rate_limit::ensure_core_rate_limit;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Maximum repositories fetched; a single page covers the whole account.
const REPOS_PER_PAGE: u8 = 100;

/// Errors that can occur while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),
}

/// A repository as returned by `GET /users/{owner}/repos`.
///
/// Only the fields the snapshot consumes are deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub has_pages: bool,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub license: Option<GithubLicense>,
}

/// License metadata attached to a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubLicense {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// A user profile as returned by `GET /users/{owner}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub followers: Option<u64>,
}

/// Builds a GitHub client, authenticated when a token is available.
///
/// Unauthenticated access works but is subject to much tighter rate limits.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed.
pub fn build_client(token: Option<String>) -> Result<Octocrab, octocrab::Error> {
    match token {
        Some(token) => Octocrab::builder().personal_token(token).build(),
        None => Octocrab::builder().build(),
    }
}

/// Lists the user's repositories, newest push first.
///
/// Fetches a single page of up to [`REPOS_PER_PAGE`] entries; private and
/// forked repos are still present in the result and are filtered by the
/// snapshot layer.
///
/// # Errors
///
/// Returns [`FetchError`] if the listing request fails.
pub async fn list_repositories(
    octocrab: &Octocrab,
    owner: &str,
) -> Result<Vec<GithubRepo>, FetchError> {
    ensure_core_rate_limit(octocrab).await?;

    let route = format!("/users/{owner}/repos?per_page={REPOS_PER_PAGE}&sort=pushed");
    debug!(route = %route, "Listing repositories");

    let repos: Vec<GithubRepo> = octocrab.get(&route, None::<&()>).await?;
    info!(owner = %owner, count = repos.len(), "Fetched repository listing");
    Ok(repos)
}

/// Fetches the user's profile.
///
/// # Errors
///
/// Returns [`FetchError`] if the profile request fails.
pub async fn fetch_profile(octocrab: &Octocrab, owner: &str) -> Result<GithubUser, FetchError> {
    let route = format!("/users/{owner}");
    let user: GithubUser = octocrab.get(&route, None::<&()>).await?;
    debug!(login = %user.login, "Fetched profile");
    Ok(user)
}
