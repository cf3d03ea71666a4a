use scraper::Html;

use super::Selectors;

/// Raw href of the "next page" link, trying each strategy in order.
pub fn extract_next_page(html: &str, sel: &Selectors) -> Option<String> {
    let doc = Html::parse_document(html);
    sel.next_page.iter().find_map(|selector| {
        doc.select(selector)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string)
    })
}
