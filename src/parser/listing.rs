use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use super::Selectors;
use crate::model::PoemStub;
use crate::utils::{collapsed_text, resolve_link};

static FIRST_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)").unwrap());

/// Poem cards of one listing page. Card links resolve against the site root.
pub fn extract_stubs(html: &str, site_root: &Url, sel: &Selectors) -> Vec<PoemStub> {
    let doc = Html::parse_document(html);
    doc.select(&sel.listing_card)
        .filter_map(|card| {
            let link = card.select(&sel.card_link).next()?;
            let title = collapsed_text(link);
            let url = resolve_link(site_root, link.value().attr("href").unwrap_or(""))?;
            if title.is_empty() {
                return None;
            }
            Some(PoemStub {
                title,
                url: url.to_string(),
                comment_count: comment_count(card, sel),
            })
        })
        .collect()
}

/// "<n> commentaire(s)" anywhere in the card, then the first number of the
/// comment link, else 0.
fn comment_count(card: ElementRef<'_>, sel: &Selectors) -> u32 {
    let text = collapsed_text(card);
    if let Some(n) = first_capture(&sel.comment_count, &text) {
        return n;
    }
    card.select(&sel.comment_link)
        .next()
        .and_then(|cl| first_capture(&FIRST_NUMBER_RE, &collapsed_text(cl)))
        .unwrap_or(0)
}

/// Counts too large for `u32` saturate instead of being dropped.
fn first_capture(re: &Regex, text: &str) -> Option<u32> {
    let digits = re.captures(text)?.get(1)?.as_str();
    Some(digits.parse().unwrap_or(u32::MAX))
}
