use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

const DEFAULT_BASE_URL: &str = "https://www.poetica.fr/";
const DEFAULT_USER_AGENT: &str = concat!(
    "poetica_harvester/",
    env!("CARGO_PKG_VERSION"),
    " (poem catalog harvester; one request per second)"
);
const ENV_PREFIX: &str = "POETICA";

/// Everything a harvest run needs, passed explicitly into the harvester.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub politeness_delay_ms: u64,
    /// Write a checkpoint every N accepted poems. 0 disables periodic writes.
    pub checkpoint_interval: usize,
    pub max_authors: Option<usize>,
    pub max_poems_per_author: Option<usize>,
    pub output: PathBuf,
    pub selectors: SiteSelectors,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 15,
            politeness_delay_ms: 1000,
            checkpoint_interval: 100,
            max_authors: None,
            max_poems_per_author: None,
            output: PathBuf::from("poetica_poems.json"),
            selectors: SiteSelectors::default(),
        }
    }
}

impl HarvestConfig {
    /// Defaults, then an optional config file, then `POETICA_*` env vars.
    ///
    /// Without an explicit path, `poetica.{toml,json,yaml}` in the working
    /// directory is picked up if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name("poetica").required(false),
        };
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let cfg: HarvestConfig = settings.try_deserialize()?;
        debug!(?cfg, "configuration loaded");
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

/// Site-specific markup hooks. Each `Vec` is a fallback chain tried in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    pub author_menu: String,
    pub theme_menu: String,
    pub listing_card: String,
    pub card_link: String,
    pub comment_link: String,
    /// Localized word following the comment count, matched case-insensitively.
    pub comment_token: String,
    pub next_page: Vec<String>,
    pub categories: Vec<String>,
    pub content: String,
    pub content_marker: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        SiteSelectors {
            author_menu: "#menu-poemes-par-auteur li a".into(),
            theme_menu: "#menu-poemes-par-theme li a".into(),
            listing_card: "article.post".into(),
            card_link: "h2.entry-title a, h1.entry-title a, .entry-title a".into(),
            comment_link: "span.comments-link".into(),
            comment_token: "commentaire".into(),
            next_page: vec!["a[rel~=next]".into(), "a.next.page-numbers".into()],
            categories: vec![
                ".cat-links a".into(),
                ".entry-footer .cat-links a".into(),
                ".posted-in a[rel~=category]".into(),
                "a[rel~=category]".into(),
                ".entry-meta a[rel~=category]".into(),
            ],
            content: "div.entry-content".into(),
            content_marker: "pstart".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_site_constants() {
        let cfg = HarvestConfig::default();
        assert_eq!(cfg.base_url, "https://www.poetica.fr/");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.politeness_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.checkpoint_interval, 100);
        assert!(cfg.max_authors.is_none());
        assert!(cfg.max_poems_per_author.is_none());
    }

    #[test]
    fn file_overrides_only_what_it_names() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "politeness_delay_ms = 250\nmax_authors = 3\n\n[selectors]\ncomment_token = \"comment\""
        )
        .unwrap();

        let cfg = HarvestConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.politeness_delay_ms, 250);
        assert_eq!(cfg.max_authors, Some(3));
        assert_eq!(cfg.selectors.comment_token, "comment");
        assert_eq!(cfg.selectors.listing_card, "article.post");
        assert_eq!(cfg.checkpoint_interval, 100);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(HarvestConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn environment_overrides_file_including_nested_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_poems_per_author = 2\n\n[selectors]\ncontent_marker = \"debut\"").unwrap();

        std::env::set_var("POETICA_MAX_POEMS_PER_AUTHOR", "7");
        std::env::set_var("POETICA_SELECTORS__CONTENT_MARKER", "poemstart");
        let loaded = HarvestConfig::load(Some(file.path()));
        std::env::remove_var("POETICA_MAX_POEMS_PER_AUTHOR");
        std::env::remove_var("POETICA_SELECTORS__CONTENT_MARKER");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.max_poems_per_author, Some(7));
        assert_eq!(cfg.selectors.content_marker, "poemstart");
        assert_eq!(cfg.selectors.author_menu, "#menu-poemes-par-auteur li a");
    }
}
