//! One-shot fetch binary for NEPSE market data
//!
//! Runs a single endpoint call and prints the JSON result to stdout, with
//! logs on stderr. Suitable for shell pipelines and cron jobs.
//!
//! # Usage
//!
//! ```bash
//! nepse-fetch --wasm nepse.wasm market-summary
//! nepse-fetch --wasm nepse.wasm today-price --date 2023-08-24 | jq '.[0]'
//! nepse-fetch --wasm nepse.wasm top gainers
//! ```
//!
//! Persistent options live in the TOML configuration file (see `--config`);
//! flags given here override it.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nepse_scraper::{
    NepseClient, Result, Settings,
    config::ConfigLoader,
    types::{BrokerQuery, TopListCategory},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "nepse-fetch")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of the exchange API
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Path of the exchange's wasm module
    #[arg(long, value_name = "PATH")]
    wasm: Option<PathBuf>,

    /// Skip TLS certificate verification (the exchange serves an incomplete
    /// chain in some regions)
    #[arg(long)]
    insecure: bool,

    /// Give up after this many application-level attempts (unbounded when
    /// unset)
    #[arg(long, value_name = "N")]
    max_attempts: Option<u32>,

    /// Delay between application-level attempts, in milliseconds
    #[arg(long, value_name = "MS")]
    retry_delay_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Market-open status
    MarketStatus,
    /// Price sheet for the latest trading day
    TodayPrice {
        /// Trading date (YYYY-MM-DD), latest when omitted
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Live per-security trades (empty while the market is closed)
    LiveMarket,
    /// Market capitalisation by date
    MarketCap,
    /// Per-security trading averages over a trailing window
    TradingAverage {
        /// Window length in days (1 through 180)
        #[arg(long, default_value_t = 120)]
        days: u32,
    },
    /// Today's market summary
    MarketSummary,
    /// Day-by-day market summary history
    MarketSummaryHistory,
    /// Turnover and volume per sector
    SectorwiseSummary,
    /// Every listed security
    Securities,
    /// Latest company news and announcements
    Disclosures,
    /// Full detail block for one security
    SecurityDetail {
        /// Ticker symbol, e.g. NABIL
        symbol: String,
    },
    /// Daily price history for one security
    PriceHistory {
        /// Ticker symbol, e.g. NABIL
        symbol: String,
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: chrono::NaiveDate,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: chrono::NaiveDate,
    },
    /// All sectors
    Sectors,
    /// Index information for every sector
    SectorIndices,
    /// Historical values for one index
    IndexHistory {
        /// Index id (51 through 67; 58 is the NEPSE index)
        index_id: i64,
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: chrono::NaiveDate,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: chrono::NaiveDate,
    },
    /// Intraday graph points for one index
    IndexGraph {
        /// Index id (51 through 67; 58 is the NEPSE index)
        index_id: i64,
    },
    /// One of the five top-ten boards
    Top {
        /// Board to fetch
        board: Board,
    },
    /// Broker member directory
    Brokers {
        /// Filter by member name
        #[arg(long)]
        member_name: Option<String>,
        /// Filter by member code
        #[arg(long)]
        member_code: Option<String>,
        /// Filter by province id
        #[arg(long)]
        province: Option<i64>,
        /// Filter by district id
        #[arg(long)]
        district: Option<i64>,
        /// Filter by municipality id
        #[arg(long)]
        municipality: Option<i64>,
    },
}

/// CLI names for the top-ten boards
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Board {
    Gainers,
    Losers,
    Turnover,
    Trade,
    Transactions,
}

impl From<Board> for TopListCategory {
    fn from(board: Board) -> Self {
        match board {
            Board::Gainers => TopListCategory::Gainers,
            Board::Losers => TopListCategory::Losers,
            Board::Turnover => TopListCategory::Turnover,
            Board::Trade => TopListCategory::TradeQuantity,
            Board::Transactions => TopListCategory::TransactionCount,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable JSON
    let default_filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = build_settings(&cli)?;
    debug!(base_url = %settings.api.base_url, "configuration resolved");

    let client = match NepseClient::new(settings) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("failed to initialize client: {err}");
            std::process::exit(1);
        }
    };

    match run_command(&client, &cli.command).await {
        Ok(value) => {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            println!("{rendered}");
            Ok(())
        }
        Err(err) => {
            eprintln!("request failed: {err}");
            std::process::exit(1);
        }
    }
}

/// Resolve settings from file, environment, and flags, in rising precedence.
fn build_settings(cli: &Cli) -> Result<Settings> {
    let loader = ConfigLoader::new();
    let config_path = cli.config.clone().or_else(ConfigLoader::default_path);
    let mut settings = loader.load(config_path.as_deref())?;

    if let Some(base_url) = &cli.base_url {
        settings.api.base_url = base_url.clone();
    }
    if let Some(wasm) = &cli.wasm {
        settings.oracle.module_path = wasm.clone();
    }
    if cli.insecure {
        settings.api.verify_tls = false;
    }
    if let Some(max_attempts) = cli.max_attempts {
        settings.retry.max_attempts = Some(max_attempts);
    }
    if let Some(delay_ms) = cli.retry_delay_ms {
        settings.retry.attempt_delay_ms = delay_ms;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        settings.api.timeout_secs = timeout_secs;
    }

    settings.validate()?;
    Ok(settings)
}

async fn run_command(client: &NepseClient, command: &Command) -> Result<Value> {
    Ok(match command {
        Command::MarketStatus => serde_json::to_value(client.market_status().await?)?,
        Command::TodayPrice { date } => Value::Array(client.today_price(*date).await?),
        Command::LiveMarket => Value::Array(client.live_market().await?),
        Command::MarketCap => client.market_cap().await?,
        Command::TradingAverage { days } => client.trading_average(*days).await?,
        Command::MarketSummary => client.market_summary().await?,
        Command::MarketSummaryHistory => client.market_summary_history().await?,
        Command::SectorwiseSummary => client.sectorwise_summary().await?,
        Command::Securities => Value::Array(client.securities().await?),
        Command::Disclosures => Value::Array(client.company_disclosures().await?),
        Command::SecurityDetail { symbol } => client.security_detail(symbol).await?,
        Command::PriceHistory { symbol, from, to } => {
            client.security_price_history(symbol, *from, *to).await?
        }
        Command::Sectors => Value::Array(client.sectors().await?),
        Command::SectorIndices => Value::Array(client.sector_indices().await?),
        Command::IndexHistory { index_id, from, to } => {
            client.index_history(*index_id, *from, *to).await?
        }
        Command::IndexGraph { index_id } => {
            Value::Array(client.live_index_graph(*index_id).await?)
        }
        Command::Top { board } => Value::Array(client.top_list((*board).into()).await?),
        Command::Brokers {
            member_name,
            member_code,
            province,
            district,
            municipality,
        } => {
            let mut query = BrokerQuery::new();
            if let Some(name) = member_name {
                query = query.with_member_name(name);
            }
            if let Some(code) = member_code {
                query = query.with_member_code(code);
            }
            if let Some(province) = province {
                query = query.with_province(*province);
            }
            if let Some(district) = district {
                query = query.with_district(*district);
            }
            if let Some(municipality) = municipality {
                query = query.with_municipality(*municipality);
            }
            client.brokers(&query).await?
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_board_maps_to_category() {
        assert_eq!(TopListCategory::from(Board::Gainers), TopListCategory::Gainers);
        assert_eq!(TopListCategory::from(Board::Trade), TopListCategory::TradeQuantity);
        assert_eq!(
            TopListCategory::from(Board::Transactions),
            TopListCategory::TransactionCount
        );
    }

    #[test]
    fn test_flag_overrides_apply() {
        let cli = Cli::parse_from([
            "nepse-fetch",
            "--base-url",
            "https://stage.example",
            "--wasm",
            "/tmp/oracle.wasm",
            "--insecure",
            "--max-attempts",
            "4",
            "--retry-delay-ms",
            "250",
            "--timeout-secs",
            "10",
            "market-status",
        ]);

        let settings = build_settings(&cli).unwrap();
        assert_eq!(settings.api.base_url, "https://stage.example");
        assert_eq!(settings.oracle.module_path, PathBuf::from("/tmp/oracle.wasm"));
        assert!(!settings.api.verify_tls);
        assert_eq!(settings.retry.max_attempts, Some(4));
        assert_eq!(settings.retry.attempt_delay_ms, 250);
        assert_eq!(settings.api.timeout_secs, 10);
    }
}
