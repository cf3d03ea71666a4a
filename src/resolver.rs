use std::collections::HashSet;

use tracing::debug;

use crate::fetcher::Fetcher;
use crate::model::MenuEntry;
use crate::parser::{extract_themes, Selectors};
use crate::utils::normalize_url;

/// Normalized URLs of every author listing, used to keep authors out of themes.
pub fn author_url_set(authors: &[MenuEntry]) -> HashSet<String> {
    authors.iter().map(|a| normalize_url(&a.url)).collect()
}

/// Themes of one poem. An unreachable page yields no themes rather than an
/// error; the poem is still recorded.
pub async fn resolve_themes(
    fetcher: &mut Fetcher,
    selectors: &Selectors,
    poem_url: &str,
    author_urls: &HashSet<String>,
) -> Vec<String> {
    let Some(page) = fetcher.fetch(poem_url).await else {
        debug!("No themes for {}: page unavailable", poem_url);
        return Vec::new();
    };
    extract_themes(&page.body, &page.url, selectors, author_urls)
}
