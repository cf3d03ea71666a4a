use std::collections::HashSet;

use tracing::{debug, warn};
use url::Url;

use crate::fetcher::Fetcher;
use crate::model::PoemStub;
use crate::parser::{extract_next_page, extract_stubs, Selectors};
use crate::utils::resolve_link;

/// One parsed listing page.
#[derive(Debug)]
pub struct ListingPage {
    pub url: Url,
    pub stubs: Vec<PoemStub>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Active,
    Done,
}

/// Lazy walk over the "next page" chain of one listing.
///
/// Stops on a missing next link, on a link already visited (redirect or
/// pagination loops), or on the first fetch failure. Once done it never
/// fetches again.
pub struct Pagination<'a> {
    fetcher: &'a mut Fetcher,
    selectors: &'a Selectors,
    site_root: &'a Url,
    current: Option<String>,
    visited: HashSet<String>,
    state: WalkState,
}

impl<'a> Pagination<'a> {
    pub fn new(
        fetcher: &'a mut Fetcher,
        selectors: &'a Selectors,
        site_root: &'a Url,
        start_url: &str,
    ) -> Self {
        Pagination {
            fetcher,
            selectors,
            site_root,
            current: Some(start_url.to_string()),
            visited: HashSet::new(),
            state: WalkState::Active,
        }
    }

    pub async fn next_page(&mut self) -> Option<ListingPage> {
        if self.state == WalkState::Done {
            return None;
        }

        let url = match self.current.take() {
            Some(u) if !u.is_empty() && !self.visited.contains(&u) => u,
            Some(u) if !u.is_empty() => {
                debug!("Pagination loop back to {}, stopping", u);
                self.state = WalkState::Done;
                return None;
            }
            _ => {
                self.state = WalkState::Done;
                return None;
            }
        };
        self.visited.insert(url.clone());

        let Some(page) = self.fetcher.fetch(&url).await else {
            warn!("Listing page {} unavailable, pagination truncated", url);
            self.state = WalkState::Done;
            return None;
        };
        self.visited.insert(page.url.to_string());

        let stubs = extract_stubs(&page.body, self.site_root, self.selectors);
        self.current = extract_next_page(&page.body, self.selectors)
            .and_then(|href| resolve_link(&page.url, &href))
            .map(String::from);

        Some(ListingPage {
            url: page.url,
            stubs,
        })
    }

    /// Distinct URLs seen so far, requested and redirected-to.
    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}
