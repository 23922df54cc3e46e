use std::path::PathBuf;

use callforpaper::cache::ResponseCache;
use callforpaper::config::{CACHE_FILE, DeadlineMode, ScrapeConfig};
use callforpaper::scraper::{WebScraper, collect_pages};
use callforpaper::utils::ModelStats;
use callforpaper::xlsx;
use clap::{Parser, ValueEnum};
use log::LevelFilter;

const DEFAULT_OUTPUT: &str = concat!(env!("CARGO_BIN_NAME"), ".xlsx");

#[derive(Parser)]
#[command(name = "callforpaper")]
#[command(
    about = "Scrapes the CCF recommended conference and journal lists into a spreadsheet",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = DEFAULT_OUTPUT,
        help = "Spreadsheet to write"
    )]
    output: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        default_value = CACHE_FILE,
        help = "SQLite file used to cache page responses"
    )]
    cache: PathBuf,

    #[arg(long, help = "Always fetch pages from the network")]
    no_cache: bool,

    #[arg(long, help = "Keep deadlines as the text shown on the page")]
    raw_dates: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn open_cache(cli: &Cli) -> Option<ResponseCache> {
    if cli.no_cache {
        return None;
    }
    ResponseCache::open(&cli.cache)
        .inspect_err(|e| log::warn!("Continuing without cache: {}", e))
        .ok()
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let config = ScrapeConfig {
        deadline_mode: if cli.raw_dates {
            DeadlineMode::Raw
        } else {
            DeadlineMode::Parsed
        },
        ..ScrapeConfig::default()
    };

    let scraper = match WebScraper::new(open_cache(&cli)) {
        Ok(scraper) => scraper,
        Err(e) => {
            log::error!("Error creating scraper: {}", e);
            return;
        }
    };

    log::info!(
        "Fetching {} page(s) from {}...",
        config.page_count,
        config.base_url
    );
    let model = collect_pages(&scraper, &config);

    for spellings in model.inconsistent_rank_labels() {
        log::warn!(
            "Rank labels differ only in case or spacing and are kept apart: {:?}",
            spellings
        );
    }

    if model.is_empty() {
        log::warn!("No pages were scraped; writing an empty sheet");
    }

    match xlsx::render(&model, &cli.output) {
        Ok(_) => print!("{}", ModelStats::from_model(&model)),
        Err(e) => log::error!("Error writing {}: {}", cli.output.display(), e),
    }
}
