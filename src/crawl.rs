use tracing::{debug, info};
use url::Url;

use crate::error::{HarvestError, Result};
use crate::fetcher::Fetcher;
use crate::model::{MenuEntry, Menus, Poem, PoemStub};
use crate::parser::{extract_menus, Selectors};
use crate::resolver::{author_url_set, resolve_themes};
use crate::settings::HarvestConfig;
use crate::store::{load_existing, PoemStore};
use crate::walker::Pagination;

/// Runs the whole harvest: menus, per-author pagination, per-poem themes,
/// checkpoints, final sort.
pub struct Harvester {
    config: HarvestConfig,
    site_root: Url,
    selectors: Selectors,
    fetcher: Fetcher,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let site_root =
            Url::parse(&config.base_url).map_err(|source| HarvestError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;
        let selectors = Selectors::compile(&config.selectors)?;
        let fetcher = Fetcher::new(&config)?;
        Ok(Harvester {
            config,
            site_root,
            selectors,
            fetcher,
        })
    }

    pub fn requests(&self) -> usize {
        self.fetcher.requests()
    }

    /// Use the persisted dataset when it has any records, otherwise crawl.
    /// `force` skips the lookup.
    pub async fn load_or_crawl(&mut self, force: bool) -> Result<Vec<Poem>> {
        if !force {
            let existing = load_existing(&self.config.output);
            if !existing.is_empty() {
                info!(
                    "{} poems loaded from {}",
                    existing.len(),
                    self.config.output.display()
                );
                return Ok(existing);
            }
        }
        self.crawl().await
    }

    /// Fetch the root page and read both menus. No authors is fatal.
    pub async fn discover_menus(&mut self) -> Result<Menus> {
        let root = self.site_root.as_str();
        let menus = match self.fetcher.fetch(root).await {
            Some(page) => extract_menus(&page.body, &page.url, &self.selectors),
            None => Menus::default(),
        };
        if menus.authors.is_empty() {
            return Err(HarvestError::NoAuthors {
                url: root.to_string(),
            });
        }
        Ok(menus)
    }

    pub async fn crawl(&mut self) -> Result<Vec<Poem>> {
        info!("Extracting menus (authors & themes)...");
        let menus = self.discover_menus().await?;
        info!(
            "{} authors and {} themes in the site menus",
            menus.authors.len(),
            menus.themes.len()
        );

        // exclusion covers every author, including those cut by max_authors
        let author_urls = author_url_set(&menus.authors);
        let mut authors = menus.authors;
        if let Some(max) = self.config.max_authors {
            authors.truncate(max);
        }

        let mut store = PoemStore::new(&self.config.output, self.config.checkpoint_interval);
        let total = authors.len();

        for (i, author) in authors.iter().enumerate() {
            info!("Author {}/{}: {}", i + 1, total, author.name);
            let stubs = self.collect_stubs(author).await;
            info!("  {} poem(s) listed", stubs.len());

            let mut added = 0usize;
            for stub in stubs {
                if store.contains(&stub.url) {
                    debug!("Already recorded: {}", stub.url);
                    continue;
                }
                let themes =
                    resolve_themes(&mut self.fetcher, &self.selectors, &stub.url, &author_urls)
                        .await;
                if store.add(Poem::from_stub(stub, &author.name, themes)) {
                    added += 1;
                }
            }
            info!("  {} new poem(s), {} in total", added, store.len());
        }

        let poems = store.finish()?;
        info!(
            "Done. {} poems saved to {} ({} requests)",
            poems.len(),
            self.config.output.display(),
            self.fetcher.requests()
        );
        Ok(poems)
    }

    /// Walk one author's listing, stopping early once the per-author cap is hit.
    async fn collect_stubs(&mut self, author: &MenuEntry) -> Vec<PoemStub> {
        let cap = self.config.max_poems_per_author.filter(|&n| n > 0);
        let mut collected = Vec::new();
        let mut walk = Pagination::new(
            &mut self.fetcher,
            &self.selectors,
            &self.site_root,
            &author.url,
        );

        while let Some(page) = walk.next_page().await {
            debug!("{} card(s) on {}", page.stubs.len(), page.url);
            for stub in page.stubs {
                collected.push(stub);
                if cap.is_some_and(|max| collected.len() >= max) {
                    return collected;
                }
            }
        }
        debug!("{}: {} listing page(s) walked", author.name, walk.visited());
        collected
    }
}
