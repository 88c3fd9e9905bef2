//! Portfolio page state and rendering.
//!
//! Search and category filtering live in an explicit application state
//! ([`SiteState`]: repos, search query, category filter) feeding pure filter
//! and render functions. The same state drives the build-time render and the
//! tests; the shipped `site.js` only re-applies the filter over the data
//! attributes the renderer emits.

mod cards;
mod featured;
mod format;
mod page;

pub use cards::{ActionLink, CardContext};
pub use featured::pick_featured;
pub use format::{compact_number, short_date};
pub use page::{build_page_context, error_page_context, PageContext, PageRenderer};

use crate::cache::asset_stamp;
use crate::config::{FeaturedPolicy, SiteConfig};
use crate::github::{self, GithubUser};
use crate::snapshot::{summarize_public, RepositorySummary, Snapshot};
use chrono::Utc;
use octocrab::Octocrab;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

/// Stylesheet written next to the generated page.
const STYLES_CSS: &str = include_str!("../../assets/styles.css");

/// Client script written next to the generated page.
const SITE_JS: &str = include_str!("../../assets/site.js");

/// Errors that can occur while rendering the site.
#[derive(Debug, Error)]
pub enum SiteError {
    /// A built-in template failed to compile.
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// Failed to write an output file.
    #[error("Failed to write '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The three-way category toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterCategory {
    #[default]
    All,
    Featured,
    Templates,
}

impl FilterCategory {
    /// Returns the category as its data-attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Featured => "featured",
            Self::Templates => "templates",
        }
    }
}

impl FromStr for FilterCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "featured" => Ok(Self::Featured),
            "templates" => Ok(Self::Templates),
            other => Err(format!(
                "unknown filter '{other}' (expected all, featured, or templates)"
            )),
        }
    }
}

/// Application state for the page: the repo list plus the active filters.
#[derive(Debug, Clone)]
pub struct SiteState {
    repos: Vec<RepositorySummary>,
    featured: Vec<String>,
    query: String,
    filter: FilterCategory,
}

impl SiteState {
    /// Builds the state, computing the featured set up front.
    pub fn new(repos: Vec<RepositorySummary>, policy: &FeaturedPolicy) -> Self {
        let featured = pick_featured(&repos, policy);
        Self {
            repos,
            featured,
            query: String::new(),
            filter: FilterCategory::All,
        }
    }

    /// The repositories backing the grid.
    pub fn repos(&self) -> &[RepositorySummary] {
        &self.repos
    }

    /// Featured repo names, best first.
    pub fn featured(&self) -> &[String] {
        &self.featured
    }

    /// The normalized search query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The active category filter.
    pub fn filter(&self) -> FilterCategory {
        self.filter
    }

    /// Sets the search query (trimmed, lowercased).
    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
    }

    /// Switches the category filter.
    ///
    /// Visibility and the no-matches panel are recomputed from scratch on
    /// every render, so a stale panel cannot survive a category switch.
    pub fn set_filter(&mut self, filter: FilterCategory) {
        self.filter = filter;
    }

    /// Whether the repo is in the featured set.
    pub fn is_featured(&self, name: &str) -> bool {
        self.featured.iter().any(|f| f == name)
    }

    /// Whether a single repo passes the active query and category filter.
    fn matches(&self, repo: &RepositorySummary) -> bool {
        let matches_query =
            self.query.is_empty() || repo.name.to_lowercase().contains(&self.query);

        let matches_filter = match self.filter {
            FilterCategory::All => true,
            FilterCategory::Featured => self.is_featured(&repo.name),
            FilterCategory::Templates => repo.is_template,
        };

        matches_query && matches_filter
    }

    /// Per-repo visibility under the active filters.
    pub fn visible(&self) -> Vec<bool> {
        self.repos.iter().map(|r| self.matches(r)).collect()
    }

    /// Number of visible cards.
    pub fn visible_count(&self) -> usize {
        self.repos.iter().filter(|r| self.matches(r)).count()
    }

    /// Whether the no-matches panel is shown: cards exist, none match.
    pub fn no_matches(&self) -> bool {
        !self.repos.is_empty() && self.visible_count() == 0
    }
}

/// Outcome of a site render.
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Repos behind the grid (zero when the error panel rendered).
    pub repo_count: usize,

    /// Cards visible under the requested filters.
    pub visible_count: usize,

    /// Whether repos came from the snapshot (false: live API fallback).
    pub from_cache: bool,

    /// Error message shown in the degraded panel, if any.
    pub degraded: Option<String>,

    /// Path of the written entry point.
    pub output: PathBuf,
}

/// Renders the portfolio page and writes it with its static assets.
///
/// Repos come from the snapshot, falling back to the live API; the profile
/// is fetched live, best-effort. Both loads are issued concurrently. If no
/// repo source is reachable the page still renders, with a single error
/// panel linking to the GitHub profile.
///
/// # Errors
///
/// Returns [`SiteError`] only for rendering and output-file failures; repo
/// source failures degrade instead.
pub async fn render_site(
    octocrab: &Octocrab,
    config: &SiteConfig,
    query: &str,
    filter: FilterCategory,
) -> Result<RenderReport, SiteError> {
    let asset_version = asset_stamp(Utc::now());

    let (profile, repos) = futures::join!(
        fetch_profile_best_effort(octocrab, &config.owner),
        load_repos(octocrab, config),
    );

    let renderer = PageRenderer::new()?;
    let output = config.paths.index_html();

    let report;
    let context = match repos {
        Ok((repos, from_cache)) => {
            let mut state = SiteState::new(repos, &config.featured);
            state.set_query(query);
            state.set_filter(filter);
            report = RenderReport {
                repo_count: state.repos().len(),
                visible_count: state.visible_count(),
                from_cache,
                degraded: None,
                output: output.clone(),
            };
            build_page_context(&state, profile.as_ref(), &config.owner, &asset_version)
        }
        Err(e) => {
            error!(error = %e, "No repo source available, rendering error panel");
            report = RenderReport {
                repo_count: 0,
                visible_count: 0,
                from_cache: false,
                degraded: Some(e.to_string()),
                output: output.clone(),
            };
            error_page_context(&config.owner, &e.to_string(), &asset_version)
        }
    };

    let html = renderer.render(&context)?;

    write_output(&output, &html)?;
    write_output(&config.paths.styles_css(), STYLES_CSS)?;
    write_output(&config.paths.site_js(), SITE_JS)?;

    info!(
        path = %output.display(),
        repos = report.repo_count,
        visible = report.visible_count,
        from_cache = report.from_cache,
        "Rendered site"
    );
    Ok(report)
}

/// Loads repos from the snapshot, falling back to the live API.
async fn load_repos(
    octocrab: &Octocrab,
    config: &SiteConfig,
) -> Result<(Vec<RepositorySummary>, bool), github::FetchError> {
    let snapshot_path = config.paths.snapshot();
    match Snapshot::load(&snapshot_path) {
        Ok(snapshot) => Ok((snapshot.repos, true)),
        Err(e) => {
            warn!(
                path = %snapshot_path.display(),
                error = %e,
                "Snapshot unavailable, falling back to live API"
            );
            let listing = github::list_repositories(octocrab, &config.owner).await?;
            Ok((summarize_public(&listing, config), false))
        }
    }
}

/// Fetches the profile, logging and dropping failures.
async fn fetch_profile_best_effort(octocrab: &Octocrab, owner: &str) -> Option<GithubUser> {
    match github::fetch_profile(octocrab, owner).await {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(owner = %owner, error = %e, "Profile fetch failed, rendering without pills");
            None
        }
    }
}

fn write_output(path: &std::path::Path, content: &str) -> Result<(), SiteError> {
    std::fs::write(path, content).map_err(|e| SiteError::IoError {
        path: path.display().to_string(),
        source: e,
    })
}
