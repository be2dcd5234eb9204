use std::pin::pin;
use std::process;

use clap::{Parser, ValueEnum};
use futures::StreamExt;
use log::LevelFilter;
use yellowpages::export::CsvSink;
use yellowpages::types::SearchQuery;
use yellowpages::{DEFAULT_MAX_PAGES, LogReporter, WebScraper};

#[derive(Parser)]
#[command(name = "yellowpages")]
#[command(about = "Scrape yellowpages.com search results into a CSV file", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(help = "Search keyword")]
    keyword: String,

    #[arg(help = "Place name")]
    place: String,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_PAGES,
        help = "Max number of pages to scrape"
    )]
    pages: u32,
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let scraper = WebScraper::new().unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    let query = SearchQuery::new(cli.keyword, cli.place).with_max_pages(cli.pages);
    let mut sink = CsvSink::new(query.output_filename());

    let mut pages = pin!(scraper.pages(&query, &LogReporter));
    while let Some(page) = pages.next().await {
        sink.write_all(&page.listings).unwrap_or_else(|e| {
            log::error!("Error writing {}: {}", sink.path().display(), e);
            process::exit(1);
        });
    }

    if sink.written() == 0 {
        log::warn!(
            "No listings found for '{}' in '{}', nothing written",
            query.keyword,
            query.place
        );
    } else {
        log::info!(
            "Wrote {} listing(s) to {}",
            sink.written(),
            sink.path().display()
        );
    }
}
