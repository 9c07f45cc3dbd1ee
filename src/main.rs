//! Press-Ingest main entry point
//!
//! This is the command-line interface for press-release ingestion.

use anyhow::Context;
use clap::{Parser, Subcommand};
use press_ingest::config::{default_config, load_config_with_hash, Config, MAX_CONCURRENT_ROWS};
use press_ingest::ingest::{
    crawl_report, import_companies, ingest_single, parse_press_date, BulkRunner, ReportSave,
    SingleRequest, Table,
};
use press_ingest::model::{LinkDescriptor, SelectionMethod};
use press_ingest::output;
use press_ingest::storage::{
    Checkpoints, CompanyStorage, CompanyStore, ConnectionPool, DocumentStorage, DocumentStore,
};
use press_ingest::{CrawlOrchestrator, HttpFetcher, ValidationError};
use serde_json::Map;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Press-Ingest: press-release crawling and ingestion
///
/// Crawls press-release pages into structured results, reports what is
/// still pending for each crawl, and stores documents and companies in a
/// local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "press-ingest")]
#[command(version)]
#[command(about = "Press-release crawling and ingestion", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one URL and report its content and pending work
    Crawl {
        url: String,

        /// Alternate URLs considered for this release
        #[arg(long = "candidate", value_name = "URL")]
        candidates: Vec<String>,

        /// Store the result (requires --ticker, --title and --date)
        #[arg(long, requires_all = ["ticker", "title"])]
        save: bool,

        #[arg(long)]
        ticker: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Press-release date (ISO-8601 or YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Crawl and store one press release
    Ingest {
        url: String,

        #[arg(long)]
        ticker: String,

        #[arg(long)]
        title: String,

        /// Press-release date (ISO-8601 or YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// Crawl and store every row of a press-release CSV
    Bulk {
        csv: PathBuf,

        /// Write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a markdown summary to this file
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Rows crawled at once (overrides bulk.max-concurrent-rows)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Manage the company registry
    #[command(subcommand)]
    Companies(CompaniesCommand),

    /// Read stored press releases
    #[command(subcommand)]
    Releases(ReleasesCommand),

    /// Provision every collection and its indexes
    Migrate,

    /// Save, list and restore database snapshots
    #[command(subcommand)]
    Checkpoint(CheckpointCommand),
}

#[derive(Subcommand, Debug)]
enum CompaniesCommand {
    /// Add or overwrite a company
    Add {
        ticker: String,
        name: String,
        #[arg(long)]
        sector: Option<String>,
    },
    /// Show one company
    Get { ticker: String },
    /// List every company
    List,
    /// Import companies from a CSV (ticker/symbol, name/company, sector)
    Import { csv: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ReleasesCommand {
    /// List a ticker's releases, newest first
    List {
        ticker: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one release with its crawl result
    Get {
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CheckpointCommand {
    Create { name: String },
    List,
    Restore { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;
    let pool = Arc::new(ConnectionPool::open(config.database.path.clone()));

    match cli.command {
        Command::Crawl {
            url,
            candidates,
            save,
            ticker,
            title,
            date,
            output,
        } => {
            let mut all_candidates = vec![url.clone()];
            all_candidates.extend(candidates);
            let link = LinkDescriptor::new(url, SelectionMethod::Cli, all_candidates, None);
            let save = match (save, ticker, title) {
                (true, Some(ticker), Some(title)) => Some((ticker, title, date)),
                _ => None,
            };
            handle_crawl(&config, pool, link, save, output.as_deref(), cli.quiet).await?;
        }
        Command::Ingest {
            url,
            ticker,
            title,
            date,
        } => {
            let request = SingleRequest {
                url,
                ticker,
                title,
                press_ts: date,
                selection_method: SelectionMethod::Cli,
            };
            let orchestrator = build_orchestrator(&config)?;
            let documents = DocumentStore::new(pool);
            let outcome = ingest_single(&orchestrator, &documents, &request).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Bulk {
            csv,
            output,
            summary,
            concurrency,
        } => {
            let limit = concurrency.unwrap_or(config.bulk.max_concurrent_rows);
            if !(1..=MAX_CONCURRENT_ROWS).contains(&limit) {
                anyhow::bail!(
                    "--concurrency must be between 1 and {}, got {}",
                    MAX_CONCURRENT_ROWS,
                    limit
                );
            }
            handle_bulk(&config, pool, &csv, limit, output.as_deref(), summary.as_deref(), cli.quiet)
                .await?;
        }
        Command::Companies(command) => handle_companies(pool, command)?,
        Command::Releases(command) => handle_releases(pool, command)?,
        Command::Migrate => {
            pool.provision_all()?;
            println!("✓ Collections provisioned in {}", config.database.path);
        }
        Command::Checkpoint(command) => {
            let checkpoints = Checkpoints::new(pool, &config.checkpoints.dir);
            handle_checkpoint(&checkpoints, command)?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("press_ingest=info,warn"),
            1 => EnvFilter::new("press_ingest=debug,info"),
            2 => EnvFilter::new("press_ingest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file when given, defaults otherwise
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok(default_config()?)
        }
    }
}

fn build_orchestrator(config: &Config) -> anyhow::Result<CrawlOrchestrator> {
    let fetcher = HttpFetcher::new(&config.fetcher).context("building HTTP client")?;
    Ok(CrawlOrchestrator::new(Arc::new(fetcher)))
}

/// Handles `crawl`: a crawl-only report, optionally stored
async fn handle_crawl(
    config: &Config,
    pool: Arc<ConnectionPool>,
    link: LinkDescriptor,
    save: Option<(String, String, Option<String>)>,
    output_path: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let documents = DocumentStore::new(pool);

    let save = match &save {
        Some((ticker, title, date)) => {
            let press_ts = match date {
                Some(date) => Some(
                    parse_press_date(date)
                        .ok_or_else(|| ValidationError::InvalidPressDate(date.clone()))?,
                ),
                None => None,
            };
            Some(ReportSave {
                documents: &documents,
                ticker,
                title,
                press_ts,
            })
        }
        None => None,
    };

    let report = crawl_report(&orchestrator, &link, save).await?;

    if !quiet {
        output::print_crawl_report(&report);
    }
    if let Some(path) = output_path {
        output::write_json_report(&report, path)?;
    }

    Ok(())
}

/// Handles `bulk`: runs a press-release CSV through the bulk runner
async fn handle_bulk(
    config: &Config,
    pool: Arc<ConnectionPool>,
    csv: &Path,
    concurrency: usize,
    output_path: Option<&Path>,
    summary_path: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let table = Table::from_csv_path(csv).with_context(|| format!("reading {}", csv.display()))?;
    let orchestrator = build_orchestrator(config)?;
    let documents = DocumentStore::new(pool);

    let report = BulkRunner::new(&orchestrator, &documents)
        .with_max_concurrent_rows(concurrency)
        .run(&table)
        .await?;

    if !quiet {
        output::print_bulk_summary(&report);
    }
    if let Some(path) = output_path {
        output::write_json_report(&report, path)?;
    }
    if let Some(path) = summary_path {
        output::generate_markdown_summary(&report, path)?;
        println!("✓ Summary exported to: {}", path.display());
    }

    Ok(())
}

fn handle_companies(pool: Arc<ConnectionPool>, command: CompaniesCommand) -> anyhow::Result<()> {
    let store = CompanyStore::new(pool);

    match command {
        CompaniesCommand::Add {
            ticker,
            name,
            sector,
        } => {
            let ticker = store.add(&ticker, &name, sector.as_deref(), Map::new())?;
            println!("✓ {} saved", ticker);
        }
        CompaniesCommand::Get { ticker } => match store.get(&ticker)? {
            Some(company) => println!("{}", serde_json::to_string_pretty(&company)?),
            None => anyhow::bail!("No company with ticker {}", ticker),
        },
        CompaniesCommand::List => output::print_companies(&store.list_all()?),
        CompaniesCommand::Import { csv } => {
            let table =
                Table::from_csv_path(&csv).with_context(|| format!("reading {}", csv.display()))?;
            let import = import_companies(&store, &table)?;
            println!("{}", serde_json::to_string_pretty(&import)?);
        }
    }

    Ok(())
}

fn handle_releases(pool: Arc<ConnectionPool>, command: ReleasesCommand) -> anyhow::Result<()> {
    let documents = DocumentStore::new(pool);

    match command {
        ReleasesCommand::List { ticker, json } => {
            let listed = documents.list_by_ticker(&ticker)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else {
                output::print_documents(&listed);
            }
        }
        ReleasesCommand::Get { id, json } => {
            let doc = documents
                .get_by_id(id)?
                .with_context(|| format!("No press release with id {}", id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                output::print_document(&doc);
            }
        }
    }

    Ok(())
}

fn handle_checkpoint(checkpoints: &Checkpoints, command: CheckpointCommand) -> anyhow::Result<()> {
    match command {
        CheckpointCommand::Create { name } => {
            for (collection, rows) in checkpoints.create(&name)? {
                println!("  {}: {} rows", collection.table(), rows);
            }
            println!("✓ Checkpoint '{}' created", name);
        }
        CheckpointCommand::List => {
            for name in checkpoints.list()? {
                println!("{}", name);
            }
        }
        CheckpointCommand::Restore { name } => {
            for (collection, rows) in checkpoints.restore(&name)? {
                println!("  {}: {} rows", collection.table(), rows);
            }
            println!("✓ Checkpoint '{}' restored", name);
        }
    }

    Ok(())
}
