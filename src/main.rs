use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stock_dashboard::api::{KrxListingClient, ListingTable, NaverChartClient, OpenAiClient};
use stock_dashboard::dashboard::{Dashboard, QuestionOutcome};
use stock_dashboard::database::PriceStore;
use stock_dashboard::export::{export_to_file, DEFAULT_EXPORT_PATH};
use stock_dashboard::models::{Config, DateRange};
use stock_dashboard::session::Session;
use stock_dashboard::ui;
use stock_dashboard::ui::question_page::MISSING_SELECTION_MESSAGE;
use stock_dashboard::ui::stock_page::PREVIEW_ROWS;
use stock_dashboard::utils::format_rows_table;

const DEFAULT_LOG_FILTER: &str = "stock_dashboard=info";

/// Fetch Korean daily stock prices into MySQL, chart them and ask an LLM about them
#[derive(Parser)]
#[command(name = "stock-dashboard")]
#[command(version)]
#[command(about = "Fetch, store, chart and question daily KRX stock prices")]
struct Cli {
    /// Settings file with HOST, USER, PASSWD, DB and OPENAI_API_KEY
    #[arg(long, short = 'c', default_value = "db.env")]
    config: PathBuf,

    /// Log file used while the terminal UI owns the screen
    #[arg(long, default_value = "stock_dashboard.log")]
    log_file: PathBuf,

    /// Where exports are written
    #[arg(long, default_value = DEFAULT_EXPORT_PATH)]
    export_path: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive two-page dashboard (default)
    Tui,
    /// Fetch a company's daily series and replace its stored table
    Fetch {
        #[arg(long)]
        company: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// Last day, YYYY-MM-DD (inclusive)
        #[arg(long)]
        end: NaiveDate,
        /// Also write the series to --export-path
        #[arg(long)]
        export: bool,
    },
    /// Ask a question about a stored window
    Ask {
        #[arg(long)]
        company: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, short = 'q')]
        question: String,
    },
    /// Show the company listing, optionally refreshing the cache
    Listing {
        #[arg(long)]
        refresh: bool,
        /// Resolve one company name to its ticker code
        #[arg(long)]
        name: Option<String>,
    },
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> stock_dashboard::Result<Config> {
    if path.exists() {
        Config::from_file(path)
    } else {
        Config::from_env()
    }
}

async fn build_dashboard(config: &Config, refresh_listing: bool) -> Result<Dashboard> {
    let database_url = config.database_url()?;
    let store = PriceStore::connect(&database_url)
        .await
        .context("cannot connect to the price store")?;

    let listing_client = KrxListingClient::new(config.http_timeout_secs)?;
    let listing = ListingTable::load_or_fetch(&listing_client, &config.listing_cache_path, refresh_listing)
        .await
        .context("cannot load the company listing")?;

    let provider = NaverChartClient::new(config.http_timeout_secs)?;
    let answerer = OpenAiClient::from_config(config)?;
    info!("Using completion model {}", answerer.model());

    Ok(Dashboard::new(store, listing, Box::new(provider), Box::new(answerer)))
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let dashboard = build_dashboard(&config, false).await?;
            ui::run_app(dashboard, cli.export_path).await?;
        }
        Command::Fetch {
            company,
            start,
            end,
            export,
        } => {
            let range = DateRange::new(start, end)?;
            let dashboard = build_dashboard(&config, false).await?;
            let outcome = dashboard.fetch_and_store(&company, range).await?;

            println!(
                "Stored {} rows for {} ({}) in {}",
                outcome.rows.len(),
                outcome.company,
                outcome.symbol,
                outcome.table
            );
            let tail = &outcome.rows[outcome.rows.len().saturating_sub(PREVIEW_ROWS)..];
            println!("{}", format_rows_table(tail));

            if export {
                export_to_file(&cli.export_path, &outcome.rows)?;
                println!("Exported to {}", cli.export_path.display());
            }
            dashboard.store().close().await;
        }
        Command::Ask {
            company,
            start,
            end,
            question,
        } => {
            let dashboard = build_dashboard(&config, false).await?;
            let mut session = Session::new();
            session.go_to_question(Some(company), Some(start), Some(end));

            match dashboard.ask(&session, &question).await? {
                QuestionOutcome::MissingSelection => println!("{}", MISSING_SELECTION_MESSAGE),
                QuestionOutcome::NoData { stock_name, range } => {
                    println!("No data for {} between {} and {}", stock_name, range.start, range.end)
                }
                QuestionOutcome::Answered { question, answer } => {
                    println!("Q: {}\n\nA: {}", question, answer)
                }
            }
            dashboard.store().close().await;
        }
        Command::Listing { refresh, name } => {
            let client = KrxListingClient::new(config.http_timeout_secs)?;
            let listing = ListingTable::load_or_fetch(&client, &config.listing_cache_path, refresh).await?;
            println!("{} listed companies ({})", listing.len(), config.listing_cache_path);

            if let Some(name) = name {
                let code = listing.resolve_ticker(&name)?;
                println!("{} => {}", name, code);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let tui = matches!(cli.command, None | Some(Command::Tui));
    let log_file = tui.then(|| cli.log_file.clone());
    if let Err(e) = init_logging(log_file.as_deref()) {
        eprintln!("❌ Logging Error: {:#}", e);
        std::process::exit(1);
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Configuration Error: {}", e);
            eprintln!(
                "Provide {} with HOST, USER, PASSWD, DB and OPENAI_API_KEY, or set DB_HOST, DB_USER, DB_PASSWD, DB_NAME and OPENAI_API_KEY in the environment.",
                cli.config.display()
            );
            std::process::exit(1);
        }
    };
    info!("Configuration loaded: {:?}", config);

    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}
