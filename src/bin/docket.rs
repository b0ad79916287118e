//! Docket CLI — crypto-case ledger over two harvest sources.
//!
//! Usage:
//!   docket harvest [--query <text>] [--db path]
//!   docket list [--folder F] [--priority P] [--search TEXT] [--db path]
//!   docket save|discard|move|delete <record> [--db path]

use clap::{Parser, Subcommand};
use docket::{
    ArchiveSearchAdapter, DocketEngine, HarvestOrchestrator, HttpGenerativeClient,
    JudicialRecordsAdapter, OpenStore, Priority, ProviderConfig, RecordFilter, ScanClient,
    SqliteStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "docket",
    version,
    about = "Harvest-and-merge engine for cryptocurrency case intelligence"
)]
struct Cli {
    /// Path to the SQLite store
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query both sources, dedup, and commit new records
    Harvest {
        /// Override the judicial-records full-text query
        #[arg(long)]
        query: Option<String>,
        /// Purge unsaved records first and re-index from scratch
        #[arg(long)]
        fresh: bool,
    },
    /// List active records
    List {
        /// Filter by folder label
        #[arg(long)]
        folder: Option<String>,
        /// Filter by priority (high/medium/low)
        #[arg(long)]
        priority: Option<String>,
        /// Case-insensitive text filter
        #[arg(long)]
        search: Option<String>,
        /// Maximum rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Toggle a record's saved flag
    Save {
        /// Record id or case signature
        record: String,
    },
    /// Discard a record (one-way)
    Discard {
        /// Record id or case signature
        record: String,
    },
    /// Move a record into a folder
    Move {
        /// Record id or case signature
        record: String,
        /// Destination folder label
        folder: String,
    },
    /// Delete a record entirely
    Delete {
        /// Record id or case signature
        record: String,
    },
    /// List folders with record counts
    Folders,
    /// List saved records
    Vault,
    /// Show or set the view preference
    View {
        /// New preference; omit to print the current one
        set: Option<String>,
    },
    /// Show ledger stats
    Stats,
}

/// Get the default database path (~/.local/share/docket/docket.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let docket_dir = data_dir.join("docket");
    std::fs::create_dir_all(&docket_dir).ok();
    docket_dir.join("docket.db")
}

fn open_engine(db: Option<PathBuf>, query: Option<String>) -> Result<DocketEngine, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store =
        SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;

    let config = Arc::new(ProviderConfig::new());
    let client: Arc<HttpGenerativeClient> = Arc::new(HttpGenerativeClient::from_env());
    let archive = ArchiveSearchAdapter::new(Arc::clone(&client) as _, Arc::clone(&config));
    let mut judicial = JudicialRecordsAdapter::new(
        Arc::new(ScanClient::new()),
        Arc::clone(&client) as _,
        Arc::clone(&config),
    );
    if let Some(query) = query {
        judicial = judicial.with_query(query);
    }
    let orchestrator = HarvestOrchestrator::new(archive, judicial, config);

    DocketEngine::open(Arc::new(store), orchestrator)
        .map_err(|e| format!("Failed to load ledger: {}", e))
}

async fn cmd_harvest(engine: &DocketEngine, fresh: bool) -> i32 {
    if fresh {
        match engine.purge_unsaved() {
            Ok(removed) => println!("Purged {} unsaved record(s). Re-indexing...", removed),
            Err(e) => {
                eprintln!("Purge failed: {}", e);
                return 1;
            }
        }
    }
    match engine.harvest().await {
        Ok(report) => {
            println!("{}", report.status_line());
            if report.downgraded {
                println!("Note: provider rate limited; running on the downgraded model tier.");
            }
            for citation in &report.citations {
                println!("  source: {} <{}>", citation.title, citation.uri);
            }
            0
        }
        Err(e) => {
            eprintln!("Harvest failed: {}", e);
            1
        }
    }
}

fn print_records(records: &[docket::CaseRecord]) {
    if records.is_empty() {
        println!("No records.");
        return;
    }
    println!(
        "{:<36}  {:<18}  {:<8}  {:<12}  {:<16}  SUMMARY",
        "ID", "SIGNATURE", "PRIORITY", "DATE", "FOLDER"
    );
    println!("{}", "-".repeat(110));
    for record in records {
        // char-wise so multibyte summaries never split mid-character
        let mut summary: String = record.summary.chars().take(48).collect();
        if summary.chars().count() < record.summary.chars().count() {
            summary.push_str("...");
        }
        println!(
            "{:<36}  {:<18}  {:<8}  {:<12}  {:<16}  {}",
            record.id,
            record.signature,
            record.priority.as_str(),
            record.date,
            record.folder,
            summary
        );
    }
}

fn cmd_list(
    engine: &DocketEngine,
    folder: Option<String>,
    priority: Option<String>,
    search: Option<String>,
    limit: Option<usize>,
) -> i32 {
    let mut filter = RecordFilter::new();
    if let Some(folder) = folder {
        filter = filter.with_folder(folder);
    }
    if let Some(priority) = priority {
        filter = filter.with_priority(Priority::parse_lenient(&priority));
    }
    if let Some(search) = search {
        filter = filter.with_text(search);
    }
    if let Some(limit) = limit {
        filter = filter.with_limit(limit);
    }
    print_records(&engine.find(&filter));
    0
}

fn resolve_or_fail(engine: &DocketEngine, reference: &str) -> Result<docket::RecordId, i32> {
    match engine.resolve(reference) {
        Some(record) => Ok(record.id),
        None => {
            eprintln!("Error: no record matches '{}'", reference);
            Err(1)
        }
    }
}

fn cmd_save(engine: &DocketEngine, reference: &str) -> i32 {
    let id = match resolve_or_fail(engine, reference) {
        Ok(id) => id,
        Err(code) => return code,
    };
    match engine.toggle_saved(id) {
        Ok(true) => {
            println!("Saved {}", id);
            0
        }
        Ok(false) => {
            println!("Unsaved {}", id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_discard(engine: &DocketEngine, reference: &str) -> i32 {
    let id = match resolve_or_fail(engine, reference) {
        Ok(id) => id,
        Err(code) => return code,
    };
    match engine.discard(id) {
        Ok(()) => {
            println!("Discarded {}", id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_move(engine: &DocketEngine, reference: &str, folder: &str) -> i32 {
    let id = match resolve_or_fail(engine, reference) {
        Ok(id) => id,
        Err(code) => return code,
    };
    match engine.move_to_folder(id, folder) {
        Ok(()) => {
            println!("Moved {} to '{}'", id, folder);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_delete(engine: &DocketEngine, reference: &str) -> i32 {
    let id = match resolve_or_fail(engine, reference) {
        Ok(id) => id,
        Err(code) => return code,
    };
    match engine.delete(id) {
        Ok(record) => {
            println!("Deleted {} ({})", id, record.signature);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_folders(engine: &DocketEngine) -> i32 {
    println!("{:<24}  {:>7}", "FOLDER", "RECORDS");
    println!("{}", "-".repeat(34));
    for (label, count) in engine.folders() {
        println!("{:<24}  {:>7}", label, count);
    }
    0
}

fn cmd_view(engine: &DocketEngine, set: Option<String>) -> i32 {
    match set {
        Some(preference) => match engine.set_view_preference(&preference) {
            Ok(()) => {
                println!("View preference set to '{}'", preference);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        None => match engine.view_preference() {
            Ok(Some(preference)) => {
                println!("{}", preference);
                0
            }
            Ok(None) => {
                println!("No view preference set.");
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    }
}

fn cmd_stats(engine: &DocketEngine) -> i32 {
    let stats = engine.stats();
    println!("Total records:   {}", stats.total);
    println!("Active:          {}", stats.active);
    println!("Saved (vault):   {}", stats.saved);
    println!("High priority:   {}", stats.high_priority);
    0
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let query = match &cli.command {
        Commands::Harvest { query, .. } => query.clone(),
        _ => None,
    };
    let engine = match open_engine(cli.db, query) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Harvest { fresh, .. } => cmd_harvest(&engine, fresh).await,
        Commands::List {
            folder,
            priority,
            search,
            limit,
        } => cmd_list(&engine, folder, priority, search, limit),
        Commands::Save { record } => cmd_save(&engine, &record),
        Commands::Discard { record } => cmd_discard(&engine, &record),
        Commands::Move { record, folder } => cmd_move(&engine, &record, &folder),
        Commands::Delete { record } => cmd_delete(&engine, &record),
        Commands::Folders => cmd_folders(&engine),
        Commands::Vault => {
            print_records(&engine.vault());
            0
        }
        Commands::View { set } => cmd_view(&engine, set),
        Commands::Stats => cmd_stats(&engine),
    };
    std::process::exit(code);
}
