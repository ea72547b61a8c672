use clap::Parser;
use miette::{IntoDiagnostic, Result};
use points_ledger::application::ledger::PointsLedger;
use points_ledger::config::LedgerConfig;
use points_ledger::domain::ledger::Points;
use points_ledger::domain::ports::KeyValueStoreBox;
use points_ledger::infrastructure::file::JsonFileStore;
use points_ledger::infrastructure::in_memory::InMemoryKeyValueStore;
use points_ledger::interfaces::csv::command_reader::CommandReader;
use points_ledger::interfaces::csv::ledger_writer::LedgerWriter;
use points_ledger::logging::init_logging;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ledger commands CSV file (`command, id, amount`)
    input: PathBuf,

    /// Path to a JSON file holding the ledger between runs.
    #[arg(long, conflicts_with = "db_path")]
    store_path: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Balance granted when the store holds no ledger yet.
    #[arg(long, default_value_t = 400)]
    starting_balance: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn open_store(cli: &Cli) -> Result<KeyValueStoreBox> {
    if let Some(path) = &cli.store_path {
        return Ok(Box::new(JsonFileStore::open(path).into_diagnostic()?));
    }

    match &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            let store = points_ledger::infrastructure::rocksdb::RocksDBStore::open(db_path)
                .into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryKeyValueStore::new()))
        }
        None => Ok(Box::new(InMemoryKeyValueStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = LedgerConfig::default().with_starting_balance(Points::new(cli.starting_balance));
    let ledger = PointsLedger::load(open_store(&cli)?, config).await;

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (row, command) in reader.commands().enumerate() {
        match command {
            Ok(command) => {
                if !ledger.execute(&command).await {
                    warn!(row = row + 1, ?command, balance = %ledger.balance(), "Insufficient balance for purchase");
                }
            }
            Err(e) => {
                error!(row = row + 1, "Error reading command: {}", e);
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());
    writer.write_ledger(&ledger.snapshot()).into_diagnostic()?;

    Ok(())
}
