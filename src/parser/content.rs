use std::sync::LazyLock;

use scraper::{Html, Node, Selector};

use super::Selectors;
use crate::utils::text_lines;

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Poem body text of a detail page.
///
/// Paragraphs after the one holding the `<!--marker -->` comment are kept,
/// lines joined with `\n`. Without a marker the whole container text is used.
/// `None` when the content container is missing.
pub fn extract_content(html: &str, sel: &Selectors) -> Option<String> {
    let doc = Html::parse_document(html);
    let container = doc.select(&sel.content).next()?;

    let mut parts = Vec::new();
    let mut capture = false;
    for p in container.select(&PARAGRAPH) {
        if !capture {
            capture = has_marker(p, &sel.content_marker);
            continue;
        }
        let paragraph = text_lines(p);
        if !paragraph.is_empty() {
            parts.push(paragraph);
        }
    }

    if parts.is_empty() {
        parts.push(text_lines(container));
    }
    Some(parts.join("\n").trim().to_string())
}

fn has_marker(p: scraper::ElementRef<'_>, marker: &str) -> bool {
    p.descendants().any(|node| match node.value() {
        Node::Comment(c) => c.trim_start().starts_with(marker),
        _ => false,
    })
}
