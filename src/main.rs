mod clean;
mod crawl;
mod enrich;
mod error;
mod fetcher;
mod model;
mod parser;
mod resolver;
mod settings;
mod store;
mod utils;
mod walker;

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use crate::crawl::Harvester;
use crate::error::HarvestError;
use crate::model::Poem;
use crate::settings::HarvestConfig;

const EXIT_NO_AUTHORS: u8 = 3;

#[derive(Parser)]
#[command(name = "poetica_harvester", about = "Poem catalog harvester for poetica.fr")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Overrides {
    /// Config file (default: ./poetica.{toml,json,yaml} if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Site root to harvest
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Dataset file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
    /// Minimum gap between two requests, in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,
    /// Only crawl the first N authors of the menu
    #[arg(long, global = true)]
    max_authors: Option<usize>,
    /// Stop listing an author after N poems
    #[arg(long, global = true)]
    max_poems: Option<usize>,
}

impl Overrides {
    fn apply(self, mut cfg: HarvestConfig) -> HarvestConfig {
        if let Some(url) = self.base_url {
            cfg.base_url = url;
        }
        if let Some(output) = self.output {
            cfg.output = output;
        }
        if let Some(ms) = self.delay_ms {
            cfg.politeness_delay_ms = ms;
        }
        if self.max_authors.is_some() {
            cfg.max_authors = self.max_authors;
        }
        if self.max_poems.is_some() {
            cfg.max_poems_per_author = self.max_poems;
        }
        cfg
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load the dataset if it exists, otherwise crawl the whole site
    Crawl {
        /// Ignore an existing dataset and crawl again
        #[arg(long)]
        force: bool,
    },
    /// Fetch every poem's body text into a separate dataset
    Enrich {
        /// Dataset to read (default: the configured output)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Enriched dataset to write
        #[arg(long, default_value = "poetica_poems_with_content.json")]
        to: PathBuf,
    },
    /// Remove author names from the categories of an existing dataset
    Clean,
    /// Summarize the dataset
    Stats {
        /// Number of most commented poems to list
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let result = run(Cli::parse()).await;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<HarvestError>() {
                Some(HarvestError::NoAuthors { .. }) => ExitCode::from(EXIT_NO_AUTHORS),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = HarvestConfig::load(cli.overrides.config.as_deref())?;
    let cfg = cli.overrides.apply(cfg);

    match cli.command {
        Commands::Crawl { force } => {
            let output = cfg.output.clone();
            let mut harvester = Harvester::new(cfg)?;
            let poems = harvester.load_or_crawl(force).await?;
            println!(
                "{} poems in {} ({} requests)",
                poems.len(),
                output.display(),
                harvester.requests()
            );
            Ok(())
        }
        Commands::Enrich { input, to } => {
            let input = input.unwrap_or_else(|| cfg.output.clone());
            let stats = enrich::enrich_dataset(&cfg, &input, &to).await?;
            println!(
                "Enriched {} poems ({} with content) -> {}",
                stats.total,
                stats.with_content,
                to.display()
            );
            Ok(())
        }
        Commands::Clean => {
            let dataset = cfg.output.clone();
            let mut harvester = Harvester::new(cfg)?;
            let changed = clean::clean_dataset(&mut harvester, &dataset).await?;
            println!("Cleaned {} records in {}", changed, dataset.display());
            Ok(())
        }
        Commands::Stats { top } => {
            let poems: Vec<Poem> = store::read_dataset(&cfg.output)?;
            if poems.is_empty() {
                println!("No poems in {}. Run 'crawl' first.", cfg.output.display());
                return Ok(());
            }
            print_stats(&poems, top);
            Ok(())
        }
    }
}

fn print_stats(poems: &[Poem], top: usize) {
    let authors: HashSet<&str> = poems.iter().map(|p| p.author.as_str()).collect();
    let mut themes: BTreeMap<&str, usize> = BTreeMap::new();
    for theme in poems.iter().flat_map(|p| &p.themes) {
        *themes.entry(theme.as_str()).or_default() += 1;
    }
    let untagged = poems.iter().filter(|p| p.themes.is_empty()).count();
    let comments: u64 = poems.iter().map(|p| u64::from(p.comment_count)).sum();

    println!("Poems:     {}", poems.len());
    println!("Authors:   {}", authors.len());
    println!("Themes:    {}", themes.len());
    println!("No theme:  {}", untagged);
    println!("Comments:  {}", comments);

    if top == 0 {
        return;
    }
    let mut ranked: Vec<&Poem> = poems.iter().collect();
    ranked.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));

    println!("\n{:>3} | {:>5} | {:<36} | {:<24}", "#", "Comm.", "Title", "Author");
    println!("{}", "-".repeat(78));
    for (i, p) in ranked.iter().take(top).enumerate() {
        println!(
            "{:>3} | {:>5} | {:<36} | {:<24}",
            i + 1,
            p.comment_count,
            truncate(&p.title, 36),
            truncate(&p.author, 24)
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
