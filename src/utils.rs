use url::Url;

/// Comparison key for taxonomy links: trimmed, lowercased, one trailing `/` removed.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    trimmed
        .strip_suffix('/')
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// Resolve `href` against `base`. Blank hrefs resolve to nothing.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok()
}

/// Text of an element on one line: every whitespace run collapsed to a space.
pub fn collapsed_text(el: scraper::ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text nodes of an element as lines: one line per non-blank node, inner
/// whitespace collapsed.
pub fn text_lines(el: scraper::ElementRef<'_>) -> String {
    el.text()
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_and_trailing_slash() {
        assert_eq!(
            normalize_url(" https://www.Poetica.fr/Categories/Jean-Dupont/ "),
            "https://www.poetica.fr/categories/jean-dupont"
        );
        assert_eq!(normalize_url("/categories/nature"), "/categories/nature");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn resolve_handles_relative_and_absolute() {
        let base = Url::parse("https://www.poetica.fr/categories/hugo/page/2/").unwrap();
        assert_eq!(
            resolve_link(&base, "../3/").unwrap().as_str(),
            "https://www.poetica.fr/categories/hugo/page/3/"
        );
        assert_eq!(
            resolve_link(&base, "/poeme-12/").unwrap().as_str(),
            "https://www.poetica.fr/poeme-12/"
        );
        assert_eq!(
            resolve_link(&base, "https://other.example/x").unwrap().as_str(),
            "https://other.example/x"
        );
        assert!(resolve_link(&base, "   ").is_none());
    }

    #[test]
    fn collapsed_text_flattens_wrapped_markup() {
        let doc = scraper::Html::parse_fragment("<a> Victor\n        Hugo </a>");
        let sel = scraper::Selector::parse("a").unwrap();
        let a = doc.select(&sel).next().unwrap();
        assert_eq!(collapsed_text(a), "Victor Hugo");
    }

    #[test]
    fn text_lines_keeps_one_line_per_node() {
        let doc = scraper::Html::parse_fragment("<p> Demain,\n   dès l'aube,<br>  Je partirai. </p>");
        let sel = scraper::Selector::parse("p").unwrap();
        let p = doc.select(&sel).next().unwrap();
        assert_eq!(text_lines(p), "Demain, dès l'aube,\nJe partirai.");
    }
}
