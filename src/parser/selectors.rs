use regex::Regex;
use scraper::Selector;

use crate::error::{HarvestError, Result};
use crate::settings::SiteSelectors;

/// [`SiteSelectors`] parsed once, ready to run against documents.
#[derive(Debug)]
pub struct Selectors {
    pub author_menu: Selector,
    pub theme_menu: Selector,
    pub listing_card: Selector,
    pub card_link: Selector,
    pub comment_link: Selector,
    pub comment_count: Regex,
    pub next_page: Vec<Selector>,
    pub categories: Vec<Selector>,
    pub content: Selector,
    pub content_marker: String,
}

impl Selectors {
    pub fn compile(site: &SiteSelectors) -> Result<Self> {
        let token = site.comment_token.trim();
        let comment_count = Regex::new(&format!(r"(?i)([0-9]+)\s*{}", regex::escape(token)))
            .map_err(|source| HarvestError::CommentToken {
                token: token.to_string(),
                source,
            })?;

        Ok(Selectors {
            author_menu: parse(&site.author_menu)?,
            theme_menu: parse(&site.theme_menu)?,
            listing_card: parse(&site.listing_card)?,
            card_link: parse(&site.card_link)?,
            comment_link: parse(&site.comment_link)?,
            comment_count,
            next_page: parse_chain(&site.next_page)?,
            categories: parse_chain(&site.categories)?,
            content: parse(&site.content)?,
            content_marker: site.content_marker.clone(),
        })
    }
}

fn parse(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn parse_chain(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors.iter().map(|s| parse(s)).collect()
}
