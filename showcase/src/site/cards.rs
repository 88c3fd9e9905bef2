//! Per-repo card assembly.
//!
//! Builds the template context for one repository card: thumbnail choice,
//! badge, tag row, and deduplicated action links.

use super::format::{compact_number, short_date};
use crate::snapshot::RepositorySummary;
use serde::Serialize;

/// Most tags shown on a card.
const MAX_TAGS: usize = 5;

/// Most topic tags shown on a card.
const MAX_TOPIC_TAGS: usize = 4;

/// Live-site thumbnail service (no API key required).
const MSHOTS_BASE: &str = "https://s.wordpress.com/mshots/v1";

/// Repo-preview image service, keyed so a new push busts the cached image.
const OPENGRAPH_BASE: &str = "https://opengraph.githubassets.com";

/// One action link under a card.
#[derive(Debug, Clone, Serialize)]
pub struct ActionLink {
    pub href: String,
    pub label: String,
    pub primary: bool,
}

/// Template context for a single card.
#[derive(Debug, Clone, Serialize)]
pub struct CardContext {
    pub name: String,
    pub name_lower: String,
    pub updated: String,
    pub badge: String,
    pub featured: bool,
    pub template: bool,
    pub hidden: bool,
    pub thumb_url: String,
    pub primary_url: String,
    pub has_description: bool,
    pub description: String,
    pub tags: Vec<String>,
    pub actions: Vec<ActionLink>,
}

/// Builds the card context for one repository.
pub fn card_context(
    repo: &RepositorySummary,
    owner: &str,
    featured: bool,
    hidden: bool,
) -> CardContext {
    let (primary_url, primary_label) = primary_cta(repo);

    CardContext {
        name: repo.name.clone(),
        name_lower: repo.name.to_lowercase(),
        updated: short_date(repo.pushed_at.as_ref()),
        badge: badge(repo, featured),
        featured,
        template: repo.is_template,
        hidden,
        thumb_url: thumbnail_url(repo, owner),
        primary_url: primary_url.clone(),
        has_description: repo.description_text().is_some(),
        description: repo.description_text().unwrap_or_default().to_string(),
        tags: build_tags(repo),
        actions: build_actions(repo, &primary_url, &primary_label),
    }
}

/// Badge precedence: Archived > Template > Featured > language > "Repo".
fn badge(repo: &RepositorySummary, featured: bool) -> String {
    if repo.archived {
        "Archived".to_string()
    } else if repo.is_template {
        "Template".to_string()
    } else if featured {
        "Featured".to_string()
    } else {
        repo.language.clone().unwrap_or_else(|| "Repo".to_string())
    }
}

/// Thumbnail priority: local screenshot, then a live-site thumbnail, then
/// the generic repo-preview image.
fn thumbnail_url(repo: &RepositorySummary, owner: &str) -> String {
    if let Some(shot) = &repo.screenshot_path {
        return format!("./{shot}");
    }

    let live_site = repo
        .site_url
        .as_deref()
        .or_else(|| repo.homepage_url());
    match live_site {
        Some(site) => mshots_url(site),
        None => opengraph_url(repo, owner),
    }
}

fn mshots_url(site: &str) -> String {
    format!("{MSHOTS_BASE}/{}?w=1200&h=630", urlencoding::encode(site))
}

fn opengraph_url(repo: &RepositorySummary, owner: &str) -> String {
    let cache_key = repo
        .pushed_at
        .map_or_else(|| "v1".to_string(), |d| d.to_rfc3339());
    format!(
        "{OPENGRAPH_BASE}/{}/{owner}/{}",
        urlencoding::encode(&cache_key),
        repo.name
    )
}

/// Primary call-to-action: the deployed site when there is one, else the
/// homepage, else the repo itself.
fn primary_cta(repo: &RepositorySummary) -> (String, String) {
    if let Some(site) = &repo.site_url {
        (site.clone(), "Visit site".to_string())
    } else if let Some(homepage) = repo.homepage_url() {
        (homepage.to_string(), "Visit homepage".to_string())
    } else {
        (repo.html_url.clone(), "Open repo".to_string())
    }
}

/// Action links, deduplicated when URLs coincide.
fn build_actions(repo: &RepositorySummary, primary_url: &str, primary_label: &str) -> Vec<ActionLink> {
    let mut actions = vec![ActionLink {
        href: primary_url.to_string(),
        label: primary_label.to_string(),
        primary: true,
    }];

    if primary_url != repo.html_url {
        actions.push(ActionLink {
            href: repo.html_url.clone(),
            label: "View Source".to_string(),
            primary: false,
        });
    }

    if let Some(hosted) = &repo.hosted_url {
        if hosted != primary_url {
            actions.push(ActionLink {
                href: hosted.clone(),
                label: "Hosted".to_string(),
                primary: false,
            });
        }
    }

    actions
}

/// Tag row: language, license, stars, then topics, capped at [`MAX_TAGS`].
fn build_tags(repo: &RepositorySummary) -> Vec<String> {
    let mut tags = Vec::new();

    if let Some(language) = &repo.language {
        tags.push(language.clone());
    }

    if let Some(spdx) = repo.license.as_ref().and_then(|l| l.spdx_id.as_deref()) {
        if spdx != "NOASSERTION" {
            tags.push(spdx.to_string());
        }
    }

    if repo.stargazers_count > 0 {
        tags.push(format!("\u{2605} {}", compact_number(repo.stargazers_count)));
    }

    for topic in repo.topics.iter().take(MAX_TOPIC_TAGS) {
        tags.push(topic.clone());
    }

    tags.truncate(MAX_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::LicenseSummary;
    use chrono::{TimeZone, Utc};

    fn repo(name: &str) -> RepositorySummary {
        RepositorySummary {
            id: 1,
            name: name.to_string(),
            full_name: format!("octocat/{name}"),
            html_url: format!("https://github.com/octocat/{name}"),
            description: String::new(),
            homepage: String::new(),
            has_pages: false,
            is_template: false,
            archived: false,
            disabled: false,
            pushed_at: None,
            updated_at: None,
            created_at: None,
            language: None,
            topics: Vec::new(),
            stargazers_count: 0,
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
    fn badge_prefers_archived_over_everything() {
        let mut r = repo("old");
        r.archived = true;
        r.is_template = true;
        r.language = Some("Rust".to_string());

        assert_eq!(badge(&r, true), "Archived");
    }

    #[test]
    fn badge_falls_back_to_language_then_repo() {
        let mut r = repo("lib");
        r.language = Some("Rust".to_string());
        assert_eq!(badge(&r, false), "Rust");

        r.language = None;
        assert_eq!(badge(&r, false), "Repo");
    }

    #[test]
    fn thumbnail_prefers_local_screenshot() {
        let mut r = repo("widget");
        r.screenshot_path = Some("assets/shots/widget.jpg".to_string());
        r.site_url = Some("https://widget.example.com".to_string());

        assert_eq!(thumbnail_url(&r, "octocat"), "./assets/shots/widget.jpg");
    }

    #[test]
    fn thumbnail_uses_live_service_for_sites() {
        let mut r = repo("widget");
        r.site_url = Some("https://widget.example.com/a b".to_string());

        let url = thumbnail_url(&r, "octocat");
        assert!(url.starts_with("https://s.wordpress.com/mshots/v1/"));
        assert!(url.contains("https%3A%2F%2Fwidget.example.com%2Fa%20b"));
        assert!(url.ends_with("?w=1200&h=630"));
    }

    #[test]
    fn thumbnail_falls_back_to_repo_preview() {
        let mut r = repo("lib");
        r.pushed_at = Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());

        let url = thumbnail_url(&r, "octocat");
        assert!(url.starts_with("https://opengraph.githubassets.com/"));
        assert!(url.ends_with("/octocat/lib"));

        r.pushed_at = None;
        assert_eq!(
            thumbnail_url(&r, "octocat"),
            "https://opengraph.githubassets.com/v1/octocat/lib"
        );
    }

    #[test]
    fn actions_deduplicate_source_link() {
        // No site and no homepage: the repo itself is the primary CTA, so
        // there is no separate source link.
        let r = repo("lib");
        let (primary_url, primary_label) = primary_cta(&r);
        assert_eq!(primary_label, "Open repo");

        let actions = build_actions(&r, &primary_url, &primary_label);
        assert_eq!(actions.len(), 1);
        assert!(actions[0].primary);
    }

    #[test]
    fn actions_include_hosted_when_distinct() {
        let mut r = repo("clawcities");
        r.hosted_url = Some("https://clawcities.com/sites/octocat".to_string());
        r.site_url = r.hosted_url.clone();

        // Hosted equals the primary CTA: deduplicated away.
        let (primary_url, primary_label) = primary_cta(&r);
        let actions = build_actions(&r, &primary_url, &primary_label);
        let labels: Vec<_> = actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Visit site", "View Source"]);

        // Distinct hosted URL: shown as a third action.
        r.site_url = Some("https://octocat.github.io/clawcities/".to_string());
        let (primary_url, primary_label) = primary_cta(&r);
        let actions = build_actions(&r, &primary_url, &primary_label);
        let labels: Vec<_> = actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Visit site", "View Source", "Hosted"]);
    }

    #[test]
    fn tags_are_capped_and_ordered() {
        let mut r = repo("widget");
        r.language = Some("Rust".to_string());
        r.license = Some(LicenseSummary {
            key: Some("mit".to_string()),
            name: Some("MIT License".to_string()),
            spdx_id: Some("MIT".to_string()),
        });
        r.stargazers_count = 1234;
        r.topics = vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
            "e".to_string(),
        ];

        let tags = build_tags(&r);

        assert_eq!(tags, vec!["Rust", "MIT", "\u{2605} 1.2K", "a", "b"]);
    }

    #[test]
    fn noassertion_license_is_not_a_tag() {
        let mut r = repo("widget");
        r.license = Some(LicenseSummary {
            key: None,
            name: None,
            spdx_id: Some("NOASSERTION".to_string()),
        });

        assert!(build_tags(&r).is_empty());
    }

    #[test]
    fn card_context_uses_placeholder_for_missing_description() {
        let r = repo("bare");
        let card = card_context(&r, "octocat", false, false);
        assert!(!card.has_description);
        assert!(card.description.is_empty());

        let mut r = repo("widget");
        r.description = "  A widget.  ".to_string();
        let card = card_context(&r, "octocat", false, false);
        assert!(card.has_description);
        assert_eq!(card.description, "A widget.");
    }
}
