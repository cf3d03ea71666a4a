use std::collections::HashSet;

use scraper::Html;
use url::Url;

use super::Selectors;
use crate::utils::{collapsed_text, normalize_url, resolve_link};

/// Category names of a poem page, minus links whose normalized target is in
/// `excluded`.
///
/// Strategies run in order and the first one that keeps at least one name
/// wins. Later, broader strategies are not consulted after that.
pub fn extract_themes(
    html: &str,
    page_url: &Url,
    sel: &Selectors,
    excluded: &HashSet<String>,
) -> Vec<String> {
    let doc = Html::parse_document(html);

    for selector in &sel.categories {
        let mut themes: Vec<String> = Vec::new();
        for a in doc.select(selector) {
            let name = collapsed_text(a);
            if name.is_empty() {
                continue;
            }
            let href = a.value().attr("href").unwrap_or("");
            let target = resolve_link(page_url, href)
                .map(|u| normalize_url(u.as_str()))
                .unwrap_or_default();
            if excluded.contains(&target) {
                continue;
            }
            if !themes.contains(&name) {
                themes.push(name);
            }
        }
        if !themes.is_empty() {
            return themes;
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SiteSelectors;

    fn sel() -> Selectors {
        Selectors::compile(&SiteSelectors::default()).unwrap()
    }

    fn page() -> Url {
        Url::parse("https://www.poetica.fr/poeme-42/").unwrap()
    }

    fn authors(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| normalize_url(u)).collect()
    }

    #[test]
    fn author_links_are_not_themes() {
        let html = r#"<footer class="entry-footer"><span class="cat-links">
            <a href="/categories/jean-dupont/" rel="category tag">Jean Dupont</a>,
            <a href="/categories/nature/" rel="category tag">Nature</a></span></footer>"#;
        let excluded = authors(&["https://www.poetica.fr/categories/jean-dupont/"]);
        assert_eq!(extract_themes(html, &page(), &sel(), &excluded), vec!["Nature"]);
    }

    #[test]
    fn exclusion_ignores_case_and_trailing_slash() {
        let html = r#"<span class="cat-links">
            <a href="https://WWW.poetica.fr/Categories/Jean-Dupont">Jean Dupont</a>
            <a href="/categories/amour/">Amour</a></span>"#;
        let excluded = authors(&["https://www.poetica.fr/categories/jean-dupont/"]);
        assert_eq!(extract_themes(html, &page(), &sel(), &excluded), vec!["Amour"]);
    }

    #[test]
    fn first_matching_strategy_wins_without_merging() {
        let html = r#"
            <span class="cat-links"><a href="/categories/nature/">Nature</a></span>
            <aside><a rel="category" href="/categories/widget/">Widget</a></aside>"#;
        let themes = extract_themes(html, &page(), &sel(), &HashSet::new());
        assert_eq!(themes, vec!["Nature"]);
    }

    #[test]
    fn falls_through_when_earlier_strategy_only_has_authors() {
        let html = r#"
            <span class="cat-links"><a href="/categories/jean-dupont/">Jean Dupont</a></span>
            <div class="entry-meta"><a rel="category tag" href="/categories/mer/">Mer</a></div>"#;
        let excluded = authors(&["https://www.poetica.fr/categories/jean-dupont/"]);
        assert_eq!(extract_themes(html, &page(), &sel(), &excluded), vec!["Mer"]);
    }

    #[test]
    fn duplicates_are_dropped_in_order() {
        let html = r#"<span class="cat-links">
            <a href="/categories/nature/">Nature</a>
            <a href="/categories/amour/">Amour</a>
            <a href="/categories/nature/">Nature</a></span>"#;
        assert_eq!(
            extract_themes(html, &page(), &sel(), &HashSet::new()),
            vec!["Nature", "Amour"]
        );
    }

    #[test]
    fn no_category_markup_is_empty() {
        assert!(extract_themes("<p>rien</p>", &page(), &sel(), &HashSet::new()).is_empty());
    }

    #[test]
    fn wrapped_category_name_is_flattened() {
        let html = r#"<span class="cat-links"><a href="/categories/amour-perdu/">
            Amour
            perdu
          </a></span>"#;
        assert_eq!(
            extract_themes(html, &page(), &sel(), &HashSet::new()),
            vec!["Amour perdu"]
        );
    }
}
