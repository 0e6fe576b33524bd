//! `asearch`: search an Amazon storefront from the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use asearch_lib::application::presentation::{
    PriceFilterOutcome, PriceRange, TableRow, filter_by_price, price_histogram, record_price,
    render_histogram, render_table,
};
use asearch_lib::infrastructure::config::{AppConfig, ConfigManager};
use asearch_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use asearch_lib::{Marketplace, SearchQuery, SearchResults, SearchService};

/// A better Amazon search: every result page, filtered by price
#[derive(Debug, Parser)]
#[command(name = "asearch", version, about)]
struct Cli {
    /// Search term; several words are joined with spaces
    #[arg(required = true, value_name = "TERM")]
    term: Vec<String>,

    /// Storefront domain: com, ca, co.uk, it, de, fr or es
    #[arg(short, long, default_value = "com")]
    marketplace: Marketplace,

    /// Lowest price to show
    #[arg(long, value_name = "PRICE")]
    min_price: Option<f64>,

    /// Highest price to show
    #[arg(long, value_name = "PRICE")]
    max_price: Option<f64>,

    /// Number of price histogram bins
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..))]
    bins: u16,

    /// Print the filtered results as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Override the configured User-Agent header
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Fetch at most this many result pages (1-50)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Configuration file (TOML, JSON, YAML, ...)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    check_price_bounds(cli.min_price, cli.max_price)?;
    let config = load_config(&cli)?;
    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();

    let query = SearchQuery::new(&cli.term.join(" "), cli.marketplace)
        .context("Invalid search term")?;
    let service = SearchService::from_app_config(&config)?;
    info!(
        "Using the {} storefront ({})",
        cli.marketplace.display_name(),
        cli.marketplace.host()
    );

    let results = match service.search(&query).await {
        Ok(results) => results,
        Err(e) => {
            error!("Search failed: {e}");
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    if results.is_partial() {
        let pages: Vec<String> = results
            .failed_pages
            .iter()
            .map(|f| f.page.to_string())
            .collect();
        warn!("Results are incomplete, failed pages: {}", pages.join(", "));
    }

    let outcome = apply_price_filter(&cli, &results);
    info!(
        "{} records in range, {} without a readable price",
        outcome.in_range.len(),
        outcome.unknown_price.len()
    );

    if cli.json {
        print_json(&results, &outcome)?;
    } else {
        print_report(cli.marketplace, usize::from(cli.bins), &outcome);
    }

    Ok(ExitCode::SUCCESS)
}

fn check_price_bounds(min: Option<f64>, max: Option<f64>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max) {
        anyhow::ensure!(
            min <= max,
            "--min-price ({min}) must not be greater than --max-price ({max})"
        );
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let manager = cli
        .config
        .as_ref()
        .map_or_else(ConfigManager::new, ConfigManager::with_path);
    let mut config = manager.load().context("Failed to load configuration")?;

    if let Some(user_agent) = &cli.user_agent {
        config.http.user_agent.clone_from(user_agent);
    }
    if let Some(max_pages) = cli.max_pages {
        config.search.max_pages = max_pages;
    }
    config.validate().context("Invalid command line override")?;

    Ok(config)
}

fn apply_price_filter(cli: &Cli, results: &SearchResults) -> PriceFilterOutcome {
    match PriceRange::from_records(cli.marketplace, &results.records) {
        Some(range) => filter_by_price(
            cli.marketplace,
            &results.records,
            &range.restrict(cli.min_price, cli.max_price),
        ),
        None => PriceFilterOutcome {
            in_range: Vec::new(),
            unknown_price: results.records.clone(),
        },
    }
}

fn print_json(results: &SearchResults, outcome: &PriceFilterOutcome) -> Result<()> {
    let report = serde_json::json!({
        "query": results.query,
        "pagesDiscovered": results.pages_discovered,
        "pagesFetched": results.pages_fetched,
        "failedPages": results.failed_pages,
        "completedAt": results.completed_at,
        "inRange": outcome.in_range,
        "unknownPrice": outcome.unknown_price,
    });
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize results")?;
    println!("{json}");
    Ok(())
}

fn print_report(marketplace: Marketplace, bins: usize, outcome: &PriceFilterOutcome) {
    let rows: Vec<TableRow> = outcome
        .in_range
        .iter()
        .chain(&outcome.unknown_price)
        .map(|record| TableRow::from_record(marketplace, record))
        .collect();
    print!("{}", render_table(&rows));

    if !outcome.in_range.is_empty() {
        let prices: Vec<f64> = outcome
            .in_range
            .iter()
            .filter_map(|record| record_price(marketplace, record))
            .collect();
        println!();
        print!("{}", render_histogram(marketplace, &price_histogram(&prices, bins)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn zero_histogram_bins_are_rejected() {
        assert!(Cli::try_parse_from(["asearch", "lamp", "--bins", "0"]).is_err());
        let cli = Cli::try_parse_from(["asearch", "lamp", "--bins", "5"]).unwrap();
        assert_eq!(cli.bins, 5);
    }

    #[test]
    fn reversed_price_bounds_are_rejected() {
        assert!(check_price_bounds(Some(200.0), Some(10.0)).is_err());
        assert!(check_price_bounds(Some(10.0), Some(200.0)).is_ok());
        assert!(check_price_bounds(Some(200.0), None).is_ok());
    }

    #[test]
    fn min_price_above_every_price_shows_nothing_in_range() {
        let cli = Cli::try_parse_from(["asearch", "lamp", "--min-price", "200"]).unwrap();
        let query = SearchQuery::new("lamp", Marketplace::UnitedStates).unwrap();
        let mut cheap = asearch_lib::Record::new("A", Marketplace::UnitedStates);
        cheap.price = Some("$5.00".to_string());
        let mut dear = asearch_lib::Record::new("B", Marketplace::UnitedStates);
        dear.price = Some("$120.00".to_string());
        let results = SearchResults {
            query,
            records: vec![cheap, dear],
            pages_discovered: 1,
            pages_fetched: 1,
            failed_pages: Vec::new(),
            completed_at: chrono::Utc::now(),
        };

        let outcome = apply_price_filter(&cli, &results);

        assert!(outcome.in_range.is_empty());
        assert!(outcome.unknown_price.is_empty());
    }
}
