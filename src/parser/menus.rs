use scraper::{Html, Selector};
use url::Url;

use super::Selectors;
use crate::model::{MenuEntry, Menus};
use crate::utils::{collapsed_text, resolve_link};

/// Author and theme navigation menus of the site root page.
pub fn extract_menus(html: &str, base: &Url, sel: &Selectors) -> Menus {
    let doc = Html::parse_document(html);
    Menus {
        authors: entries(&doc, &sel.author_menu, base),
        themes: entries(&doc, &sel.theme_menu, base),
    }
}

fn entries(doc: &Html, selector: &Selector, base: &Url) -> Vec<MenuEntry> {
    doc.select(selector)
        .filter_map(|a| {
            let name = collapsed_text(a);
            let href = a.value().attr("href").unwrap_or("");
            if name.is_empty() {
                return None;
            }
            let url = resolve_link(base, href)?;
            Some(MenuEntry {
                name,
                url: url.to_string(),
            })
        })
        .collect()
}
