#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod cache;
pub mod config;
pub mod github;
pub mod rate_limit;
pub mod shots;
pub mod site;
pub mod snapshot;

pub use cache::{bump_asset_version, update_cache, CacheError, UpdateReport};
pub use config::{BrowserConfig, ConfigError, FeaturedPolicy, SiteConfig};
pub use github::{build_client, FetchError, GithubRepo, GithubUser};
pub use shots::{capture_shots, CaptureSummary, ShotError};
pub use site::{render_site, FilterCategory, RenderReport, SiteError, SiteState};
pub use snapshot::{RepositorySummary, Snapshot, SnapshotError};
