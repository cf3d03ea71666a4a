use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::model::{EnrichedPoem, Poem};
use crate::parser::{extract_content, Selectors};
use crate::settings::HarvestConfig;
use crate::store::{read_dataset, write_json_atomic};

pub struct EnrichStats {
    pub total: usize,
    pub with_content: usize,
}

/// Attach each poem's body text and write the result to `output`.
/// The input dataset is only read.
pub async fn enrich_dataset(
    config: &HarvestConfig,
    input: &Path,
    output: &Path,
) -> Result<EnrichStats> {
    let poems: Vec<Poem> = read_dataset(input)?;
    let selectors = Selectors::compile(&config.selectors)?;
    let mut fetcher = Fetcher::new(config)?;

    info!("Enriching {} poems from {}", poems.len(), input.display());
    let pb = ProgressBar::new(poems.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut enriched = Vec::with_capacity(poems.len());
    let mut with_content = 0usize;
    for poem in poems {
        let content = fetch_content(&mut fetcher, &selectors, &poem.url).await;
        if !content.is_empty() {
            with_content += 1;
        }
        enriched.push(EnrichedPoem { poem, content });
        pb.inc(1);
    }
    pb.finish_and_clear();

    write_json_atomic(output, &enriched)?;
    info!(
        "Enriched dataset saved to {} ({} of {} with content)",
        output.display(),
        with_content,
        enriched.len()
    );
    Ok(EnrichStats {
        total: enriched.len(),
        with_content,
    })
}

async fn fetch_content(fetcher: &mut Fetcher, selectors: &Selectors, url: &str) -> String {
    let Some(page) = fetcher.fetch(url).await else {
        return String::new();
    };
    match extract_content(&page.body, selectors) {
        Some(text) => text,
        None => {
            warn!("No main content found for {}", url);
            String::new()
        }
    }
}
