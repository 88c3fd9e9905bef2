//! Featured repo heuristic.
//!
//! Pinned repos are not available unauthenticated, so "featured" is a
//! heuristic: the top repos by star count, ties broken by more recent push.
//! The set size is a policy knob ([`FeaturedPolicy`]), not fixed logic.

use crate::config::FeaturedPolicy;
use crate::snapshot::RepositorySummary;

/// Picks the featured repo names, best first.
///
/// Archived repos never qualify. Forked repos are excluded upstream by the
/// snapshot layer. Repos with no recorded push date sort last among ties.
pub fn pick_featured(repos: &[RepositorySummary], policy: &FeaturedPolicy) -> Vec<String> {
    let mut candidates: Vec<&RepositorySummary> = repos.iter().filter(|r| !r.archived).collect();

    candidates.sort_by(|a, b| {
        b.stargazers_count
            .cmp(&a.stargazers_count)
            .then_with(|| b.pushed_at.cmp(&a.pushed_at))
    });

    candidates
        .into_iter()
        .take(policy.max)
        .map(|r| r.name.clone())
        .collect()
}
