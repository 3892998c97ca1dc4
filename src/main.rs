mod api;
mod app;
mod card;
mod catalog;
mod config;
mod logging;
mod models;
mod paginate;
mod request;
mod selection;
mod tui;
mod viewport;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use api::{HttpJobBoard, JobBoard};
use catalog::CategoryCatalog;
use config::Config;
use models::Partition;
use paginate::ResultPaginator;
use request::{RequestHints, SearchRequest};
use selection::{KeywordKind, SelectionState};
use viewport::ViewMode;

#[derive(Parser)]
#[command(name = "jobfinder")]
#[command(about = "Filter aggregated job postings by category, keyword and region")]
struct Cli {
    /// Job service base URL (overrides JOB_FINDER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse interactively (default)
    Browse,

    /// List job categories and their keyword vocabularies
    Categories,

    /// Run one search and print a page of results
    Search {
        /// Category ID
        #[arg(short, long)]
        category: String,

        /// Region filter (only applied when exactly one is given)
        #[arg(short, long = "region")]
        regions: Vec<String>,

        /// Restrict to these keywords (default: all keywords of the category)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Page of matched results to show
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Also print the excluded postings
        #[arg(long)]
        excluded: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref(), cli.api_url.as_deref())?;

    match cli.command.unwrap_or(Commands::Browse) {
        Commands::Browse => {
            let log_path = logging::default_log_path();
            logging::init_file(&log_path)?;
            tracing::info!(api = %config.api_base, "starting browser");

            let board: Arc<dyn JobBoard> = Arc::new(HttpJobBoard::new(&config)?);
            tui::run_browse(&config, board).await?;
        }

        Commands::Categories => {
            logging::init_stderr()?;
            let board = HttpJobBoard::new(&config)?;
            let categories = board
                .categories()
                .await
                .with_context(|| format!("Failed to load categories from {}", board.base()))?;

            if categories.is_empty() {
                println!("No categories found.");
            } else {
                println!("{:<16} {:<24} {:>5} {:>5}", "ID", "NAME", "CORE", "AUX");
                println!("{}", "-".repeat(53));
                for category in &categories {
                    println!(
                        "{:<16} {:<24} {:>5} {:>5}",
                        truncate(&category.id, 14),
                        truncate(&category.name, 22),
                        category.core_keywords.len(),
                        category.auxiliary_keywords.len()
                    );
                }
            }
        }

        Commands::Search {
            category,
            regions,
            keywords,
            page,
            excluded,
        } => {
            logging::init_stderr()?;
            let board = HttpJobBoard::new(&config)?;
            let catalog = CategoryCatalog::new(
                board
                    .categories()
                    .await
                    .with_context(|| format!("Failed to load categories from {}", board.base()))?,
            );

            let mut selection = SelectionState::new();
            if !selection.set_category(&catalog, &category) {
                bail!("Unknown category '{}'. Run 'jobfinder categories' to list them.", category);
            }
            for region in &regions {
                selection.toggle_location(region);
            }
            restrict_keywords(&mut selection, &keywords)?;

            let request = SearchRequest::from_selection(&selection, RequestHints::from(&config))?;
            println!("Searching {}...", category);
            let result = board
                .search(&request)
                .await
                .context("Search failed: check that the backend server is running")?;

            let mut paginator = ResultPaginator::new(result, config.page_size, config.reveal_margin_rows);
            let len = paginator.len(Partition::Matched);
            paginator.pager_mut(Partition::Matched).pages.go_to(page, len);

            let summary = paginator.result();
            println!(
                "Matched {} | Excluded {}\n",
                summary.count_label(Partition::Matched),
                summary.count_label(Partition::Excluded)
            );
            print_page(&paginator, Partition::Matched);
            if excluded {
                println!("\nExcluded postings:");
                print_page(&paginator, Partition::Excluded);
            }
        }
    }

    Ok(())
}

/// Narrows a full selection down to `keywords`; empty means "no restriction".
fn restrict_keywords(selection: &mut SelectionState, keywords: &[String]) -> Result<()> {
    if keywords.is_empty() {
        return Ok(());
    }
    for kind in [KeywordKind::Core, KeywordKind::Aux] {
        if selection.is_all_selected(kind) {
            selection.toggle_all_keywords(kind);
        }
    }
    for keyword in keywords {
        let kind = [KeywordKind::Core, KeywordKind::Aux]
            .into_iter()
            .find(|kind| selection.vocabulary(*kind).contains(keyword))
            .ok_or_else(|| anyhow!("Keyword '{}' is not in this category's vocabulary", keyword))?;
        if !selection.is_keyword_selected(kind, keyword) {
            selection.toggle_keyword(kind, keyword);
        }
    }
    Ok(())
}

fn print_page(paginator: &ResultPaginator, partition: Partition) {
    let jobs = paginator.visible(partition, ViewMode::Regular);
    if jobs.is_empty() {
        println!("No postings.");
        return;
    }
    let offset = paginator.visible_offset(partition, ViewMode::Regular);

    println!("{:<5} {:<10} {:<20} {:<40}", "#", "SOURCE", "COMPANY", "TITLE");
    println!("{}", "-".repeat(78));
    for (i, job) in jobs.iter().enumerate() {
        println!(
            "{:<5} {:<10} {:<20} {:<40}",
            offset + i + 1,
            truncate(&job.source, 10),
            truncate(&job.company, 18),
            truncate(&job.title, 40)
        );
        let mut chips = job.matched_keywords.join(", ");
        if partition == Partition::Excluded && !job.excluded_keywords.is_empty() {
            chips.push_str(&format!("  excluded: {}", job.excluded_keywords.join(", ")));
        }
        if !chips.is_empty() {
            println!("      {}", chips);
        }
        println!("      {}", job.link);
    }
    let selector = paginator.selector(partition);
    println!("\nPage {}/{}", selector.current, selector.total);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
