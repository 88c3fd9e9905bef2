//! Page rendering via Handlebars.

use super::cards::{card_context, CardContext};
use super::format::{compact_number, short_date};
use super::{SiteError, SiteState};
use crate::github::GithubUser;
use chrono::{Datelike, Utc};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde::Serialize;

/// Header profile pills.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileContext {
    pub login: String,
    pub location: Option<String>,
    pub followers: Option<String>,
}

impl ProfileContext {
    fn from_user(user: &GithubUser) -> Self {
        Self {
            login: user.login.clone(),
            location: user.location.clone(),
            followers: user.followers.map(compact_number),
        }
    }
}

/// Aggregate header stats.
#[derive(Debug, Clone, Serialize)]
pub struct StatsContext {
    pub repo_count: usize,
    pub total_stars: String,
    pub latest_push: String,
}

/// Full template context for the page.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub owner: String,
    pub asset_version: String,
    pub year: i32,
    pub profile: Option<ProfileContext>,
    pub stats: StatsContext,
    pub query: String,
    pub filter: String,
    pub cards: Vec<CardContext>,
    pub no_matches: bool,
    pub error: Option<String>,
}

/// Builds the page context from the application state.
pub fn build_page_context(
    state: &SiteState,
    profile: Option<&GithubUser>,
    owner: &str,
    asset_version: &str,
) -> PageContext {
    let visible = state.visible();
    let cards = state
        .repos()
        .iter()
        .zip(visible.iter())
        .map(|(repo, &shown)| card_context(repo, owner, state.is_featured(&repo.name), !shown))
        .collect();

    let total_stars: u64 = state.repos().iter().map(|r| r.stargazers_count).sum();
    let latest_push = state.repos().iter().filter_map(|r| r.pushed_at).max();

    PageContext {
        owner: owner.to_string(),
        asset_version: asset_version.to_string(),
        year: Utc::now().year(),
        profile: profile.map(ProfileContext::from_user),
        stats: StatsContext {
            repo_count: state.repos().len(),
            total_stars: compact_number(total_stars),
            latest_push: short_date(latest_push.as_ref()),
        },
        query: state.query().to_string(),
        filter: state.filter().as_str().to_string(),
        cards,
        no_matches: state.no_matches(),
        error: None,
    }
}

/// Builds the degraded context shown when no repo source is reachable.
pub fn error_page_context(owner: &str, message: &str, asset_version: &str) -> PageContext {
    PageContext {
        owner: owner.to_string(),
        asset_version: asset_version.to_string(),
        year: Utc::now().year(),
        profile: None,
        stats: StatsContext {
            repo_count: 0,
            total_stars: "0".to_string(),
            latest_push: short_date(None),
        },
        query: String::new(),
        filter: "all".to_string(),
        cards: Vec::new(),
        no_matches: false,
        error: Some(message.to_string()),
    }
}

/// Renders the portfolio page from registered templates.
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    /// Creates a renderer with the page and card templates registered.
    ///
    /// HTML escaping stays enabled: repo descriptions and topics come from
    /// the GitHub API and land in markup.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError`] if a built-in template fails to compile.
    pub fn new() -> Result<Self, SiteError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_helper("eq", Box::new(eq_helper));
        handlebars.register_template_string("page", include_str!("templates/page.hbs"))?;
        handlebars.register_template_string("card", include_str!("templates/card.hbs"))?;
        Ok(Self { handlebars })
    }

    /// Renders the full page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError`] if rendering fails.
    pub fn render(&self, context: &PageContext) -> Result<String, SiteError> {
        Ok(self.handlebars.render("page", context)?)
    }
}

/// Helper for equality comparison in templates.
///
/// Usage: `{{#if (eq filter "all")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeaturedPolicy;
    use crate::snapshot::RepositorySummary;

    fn repo(name: &str, stars: u64) -> RepositorySummary {
        RepositorySummary {
            id: 1,
            name: name.to_string(),
            full_name: format!("octocat/{name}"),
            html_url: format!("https://github.com/octocat/{name}"),
            description: "A thing.".to_string(),
            homepage: String::new(),
            has_pages: false,
            is_template: false,
            archived: false,
            disabled: false,
            pushed_at: None,
            updated_at: None,
            created_at: None,
            language: Some("Rust".to_string()),
            topics: Vec::new(),
            stargazers_count: stars,
            forks_count: 0,
            open_issues_count: 0,
            license: None,
            hosted_url: None,
            pages_url: None,
            site_url: None,
            screenshot_path: None,
        }
    }

    #[test]
    fn renders_cards_and_stats() {
        let state = SiteState::new(
            vec![repo("widget", 1500), repo("gadget", 2)],
            &FeaturedPolicy::default(),
        );
        let renderer = PageRenderer::new().unwrap();

        let html = renderer
            .render(&build_page_context(&state, None, "octocat", "1"))
            .unwrap();

        assert!(html.contains("data-name=\"widget\""));
        assert!(html.contains("data-name=\"gadget\""));
        assert!(html.contains("1.5K"));
        assert!(html.contains("styles.css?v=1"));
        assert!(html.contains("site.js?v=1"));
        assert!(!html.contains("No matches."));
    }

    #[test]
    fn renders_profile_pills_when_available() {
        let state = SiteState::new(vec![repo("widget", 0)], &FeaturedPolicy::default());
        let user = GithubUser {
            login: "octocat".to_string(),
            name: None,
            location: Some("San Francisco".to_string()),
            followers: Some(1234),
        };
        let renderer = PageRenderer::new().unwrap();

        let html = renderer
            .render(&build_page_context(&state, Some(&user), "octocat", "1"))
            .unwrap();

        assert!(html.contains("@octocat"));
        assert!(html.contains("San Francisco"));
        assert!(html.contains("1.2K followers"));
    }

    #[test]
    fn escapes_description_markup() {
        let mut evil = repo("evil", 0);
        evil.description = "<script>alert('x')</script>".to_string();
        let state = SiteState::new(vec![evil], &FeaturedPolicy::default());
        let renderer = PageRenderer::new().unwrap();

        let html = renderer
            .render(&build_page_context(&state, None, "octocat", "1"))
            .unwrap();

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn error_context_renders_single_panel_with_profile_link() {
        let renderer = PageRenderer::new().unwrap();

        let html = renderer
            .render(&error_page_context("octocat", "boom", "1"))
            .unwrap();

        assert_eq!(html.matches("errorPanel").count(), 1);
        assert!(html.contains("Couldn’t load repos right now."));
        assert!(html.contains("boom"));
        assert!(html.contains("https://github.com/octocat"));
        assert!(!html.contains("data-name="));
    }
}
