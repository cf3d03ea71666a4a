use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::crawl::Harvester;
use crate::error::Result;
use crate::model::Poem;
use crate::store::{read_dataset, write_json_atomic};

/// Remove author names that slipped into `categories` of an existing dataset.
///
/// The author menu is fetched once; the dataset is rewritten only when at
/// least one record changed. Returns the number of changed records.
pub async fn clean_dataset(harvester: &mut Harvester, path: &Path) -> Result<usize> {
    let mut poems: Vec<Poem> = read_dataset(path)?;
    let menus = harvester.discover_menus().await?;
    let names: Vec<String> = menus.authors.into_iter().map(|a| a.name).collect();

    let changed = strip_author_categories(&mut poems, &names);
    if changed > 0 {
        write_json_atomic(path, &poems)?;
    }
    info!(
        "{} of {} records cleaned in {}",
        changed,
        poems.len(),
        path.display()
    );
    Ok(changed)
}

/// Matching is on trimmed, lowercased names.
pub fn strip_author_categories(poems: &mut [Poem], author_names: &[String]) -> usize {
    let authors: HashSet<String> = author_names.iter().map(|n| fold(n)).collect();
    let mut changed = 0;
    for poem in poems.iter_mut() {
        let before = poem.themes.len();
        poem.themes.retain(|t| !authors.contains(&fold(t)));
        if poem.themes.len() != before {
            changed += 1;
        }
    }
    changed
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}
