//! finchart main entry point

mod page;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use finchart_codec::{format_amount, AmountFormat};
use finchart_config::{Config, ConfigError};
use finchart_core::{
    CategoryAxis, ChartConfig, ChartEngine, ChartLocale, ConverterRegistry, DrillDownEvent,
    FeedState, FileStatisticsSource, Granularity, StatisticsFeed, StatisticsQuery,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use page::ChartPage;

#[derive(Parser, Debug)]
#[command(name = "finchart")]
#[command(version = "0.1.0")]
#[command(about = "Drillable income and expense charts from wallet statistics", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "finchart.yaml")]
    config: PathBuf,

    /// Year to open; defaults to the latest year with statistics
    #[arg(short, long)]
    year: Option<i32>,

    /// Restrict the chart to one wallet
    #[arg(short, long)]
    wallet: Option<String>,

    /// Click at an x-position, in order; may be repeated
    #[arg(long = "click", allow_negative_numbers = true)]
    clicks: Vec<f64>,

    /// Print the years with statistics and exit
    #[arg(long)]
    list_years: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Serialize)]
struct Totals {
    income: String,
    expenses: String,
}

#[derive(Serialize)]
struct Output<'a> {
    query: &'a StatisticsQuery,
    locale: String,
    currency: &'a str,
    totals: Totals,
    events: &'a [DrillDownEvent],
    chart: Option<&'a ChartConfig>,
}

fn load_config(path: PathBuf) -> anyhow::Result<(Config, bool)> {
    match Config::load(path.clone()) {
        Ok(config) => Ok((config, false)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), true)),
        Err(e) => Err(anyhow!("{}", e.to_details()))
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, defaulted) = load_config(args.config.clone())?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    if defaulted {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!("Statistics directory: {}", config.statistics_path().display());

    let rt = Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let locale = ChartLocale::from_config(&config.locale);
    let source = Arc::new(FileStatisticsSource::new(config.statistics_path()));
    let mut feed = StatisticsFeed::new(source, locale.calendar());

    let years = feed
        .available_years()
        .await
        .context("Failed to list available years")?;
    if args.list_years {
        println!("{}", serde_json::to_string(&years)?);
        return Ok(());
    }

    let year = match args.year.or_else(|| years.last().copied()) {
        Some(year) => year,
        None => bail!("No statistics found in {}", config.statistics_path().display()),
    };
    let query = match args.wallet {
        Some(wallet_id) => StatisticsQuery::Wallet { wallet_id, year },
        None => StatisticsQuery::Year(year),
    };

    let registry = ConverterRegistry::standard();
    let converters = registry.data_converters(&config.chart.metrics);
    let engine = ChartEngine::new(
        registry,
        locale,
        Granularity::Year,
        converters,
        CategoryAxis::new(config.chart.plot_start, config.chart.plot_end),
    )
    .map_err(|e| anyhow!("{}", e.to_details()))?;
    let mut page = ChartPage::new(engine);

    let generation = feed.select(query.clone());
    let state = feed.settled(generation).await;
    page.show_snapshot(&state)
        .map_err(|e| anyhow!("{}", e.to_details()))?;
    let node = match state {
        FeedState::Ready { node, .. } => node,
        FeedState::Failed { error, .. } => {
            bail!("Failed to load statistics for {}: {}", query, error.to_details())
        }
        other => bail!("Statistics for {} did not settle: {:?}", query, other),
    };

    for x in &args.clicks {
        match page.handle_click(*x) {
            Ok(Some(event)) => log::info!("Opened {} {} ({})", event.granularity, event.ordinal, event.label),
            Ok(None) => log::info!("Click at {} did not drill down", x),
            Err(e) => bail!("Drill-down failed: {}", e.to_details()),
        }
    }

    let format = AmountFormat {
        thousands_separator: config.currency.thousands_separator.clone(),
        decimal_separator: config.currency.decimal_separator.clone(),
    };
    let output = Output {
        query: &query,
        locale: locale.id(),
        currency: &config.currency.code,
        totals: Totals {
            income: format_amount(node.totals().income, &format),
            expenses: format_amount(node.totals().expenses, &format),
        },
        events: page.history(),
        chart: page.current(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
