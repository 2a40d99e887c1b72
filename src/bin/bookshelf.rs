use std::path::PathBuf;
use std::process::ExitCode;

use bookshelf::cli::{self as prog_cli, Command, OutputMode};
use bookshelf::config::{AppConfig, Backend, load_config};
use bookshelf::errors::BookError;
use bookshelf::facade::BookQueries;
use bookshelf::logger;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookshelf", version, about = "Canned queries and reports over a books collection", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). If omitted, default locations are searched.")]
    config: Option<PathBuf>,
    #[arg(long, help = "MongoDB connection string. Takes precedence over config/env.")]
    uri: Option<String>,
    #[arg(long, help = "Database name (default: library)")]
    database: Option<String>,
    #[arg(long, help = "Collection name (default: books)")]
    collection: Option<String>,
    #[arg(long, help = "Use an in-process collection instead of MongoDB")]
    memory: bool,
    #[arg(long, help = "NDJSON or JSON array file loaded into the collection before the command runs")]
    seed: Option<PathBuf>,
    #[arg(long, help = "Directory for app.log and audit.log")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, help = "Number of rolled log files to keep (default 7)")]
    log_retention: Option<u32>,
    #[arg(long, conflicts_with = "plain", help = "Print results as JSON")]
    json: bool,
    #[arg(long, help = "Print one tab-separated line per result")]
    plain: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(name = "by-genre", about = "Find all books in a genre")]
    ByGenre {
        #[arg(help = "Exact genre, e.g. \"Historical Fiction\"")]
        genre: String,
    },
    #[command(name = "published-after", about = "Find books published after a year")]
    PublishedAfter { year: i32 },
    #[command(name = "by-author", about = "Find all books by an author")]
    ByAuthor { author: String },
    #[command(name = "in-stock-after", about = "Find in-stock books published after a year")]
    InStockAfter { year: i32 },
    #[command(about = "Title, author and price of the books in a genre")]
    Projected { genre: String },
    #[command(about = "All books ordered by price")]
    Sorted {
        #[arg(default_value = "asc", help = "asc|desc")]
        order: String,
    },
    #[command(about = "One page of books under an explicit sort")]
    Page {
        #[arg(help = "Zero-based page number")]
        page: u64,
        #[arg(long, default_value_t = 5, help = "Books per page")]
        size: u64,
        #[arg(long, default_value = "title", help = "Sort key: field, +field or -field")]
        sort: String,
    },
    #[command(name = "update-price", about = "Set the price of a book by title")]
    UpdatePrice { title: String, price: f64 },
    #[command(name = "delete", about = "Delete a book by title")]
    Delete { title: String },
    #[command(name = "avg-price", about = "Average price per genre")]
    AvgPrice,
    #[command(name = "top-author", about = "Author with the most books")]
    TopAuthor,
    #[command(about = "Number of books per publication decade")]
    Decades,
    #[command(about = "Run all three aggregation reports")]
    Reports,
    #[command(name = "create-indexes", about = "Ensure the title and author/published_year indexes exist")]
    CreateIndexes,
    #[command(about = "List secondary indexes")]
    Indexes,
    #[command(about = "Import books from an NDJSON or JSON array file")]
    Seed {
        file: PathBuf,
        #[arg(long, help = "ndjson|json; auto-detected by default")]
        format: Option<String>,
        #[arg(long, help = "Skip undecodable records instead of failing")]
        skip_errors: bool,
    },
}

fn to_command(c: Commands) -> Result<Command, BookError> {
    Ok(match c {
        Commands::ByGenre { genre } => Command::FindByGenre { genre },
        Commands::PublishedAfter { year } => Command::PublishedAfter { year },
        Commands::ByAuthor { author } => Command::ByAuthor { author },
        Commands::InStockAfter { year } => Command::InStockAfter { year },
        Commands::Projected { genre } => Command::Projected { genre },
        Commands::Sorted { order } => Command::Sorted { order: prog_cli::parse_order(&order)? },
        Commands::Page { page, size, sort } => {
            Command::Page { page, size, order_by: prog_cli::parse_sort_spec(&sort)? }
        }
        Commands::UpdatePrice { title, price } => Command::UpdatePrice { title, price },
        Commands::Delete { title } => Command::DeleteByTitle { title },
        Commands::AvgPrice => Command::AveragePriceByGenre,
        Commands::TopAuthor => Command::TopAuthor,
        Commands::Decades => Command::ByDecade,
        Commands::Reports => Command::Reports,
        Commands::CreateIndexes => Command::CreateIndexes,
        Commands::Indexes => Command::Indexes,
        Commands::Seed { file, format, skip_errors } => Command::Seed {
            file,
            format: prog_cli::parse_import_format(format.as_deref()),
            skip_errors,
        },
    })
}

// CLI flags take precedence over env and config files
fn apply_overrides(mut cfg: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(u) = &cli.uri { cfg.uri = u.clone(); }
    if let Some(d) = &cli.database { cfg.database = d.clone(); }
    if let Some(c) = &cli.collection { cfg.collection = c.clone(); }
    if cli.memory { cfg.backend = Backend::Memory; }
    if let Some(s) = &cli.seed { cfg.seed_file = Some(s.clone()); }
    if let Some(d) = &cli.log_dir { cfg.log_dir = Some(d.clone()); }
    if let Some(l) = &cli.log_level { cfg.log_level = Some(l.clone()); }
    if let Some(r) = cli.log_retention { cfg.log_retention = Some(r); }
    cfg
}

fn real_main(cli: Cli) -> Result<(), BookError> {
    let cfg = apply_overrides(load_config(cli.config.as_deref())?, &cli);
    logger::configure_logging(cfg.log_dir.as_deref(), cfg.log_level.as_deref(), cfg.log_retention)?;
    log::info!("bookshelf starting: backend={:?} db={} collection={}", cfg.backend, cfg.database, cfg.collection);

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.plain {
        OutputMode::Plain
    } else {
        OutputMode::Human
    };
    let cmd = to_command(cli.command)?;
    let queries = BookQueries::open(&cfg)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    prog_cli::run_with_format(&queries, cmd, mode, &mut out)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match real_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
