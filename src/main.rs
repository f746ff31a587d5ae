// Customer Ledger - interactive console
// Loads config, wires logging into a file and hands stdin/stdout to the menus.

use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use customer_ledger::console::{is_end_of_input, Console};
use customer_ledger::ui::App;
use customer_ledger::{ActivityLog, AppConfig, CustomerRepository};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "customer-ledger", version, about = "In-memory customer and contract register")]
struct Cli {
    /// JSON config file (all fields optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the log file from the config
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Snapshot to merge before the first prompt
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }

    init_logging(&config.log_file)?;
    tracing::info!(version = customer_ledger::VERSION, "session started");

    let repo = CustomerRepository::new(ActivityLog::with_capacity(
        &config.actor,
        config.activity_capacity,
    ));
    let stdin = io::stdin();
    let console = Console::new(stdin.lock(), io::stdout(), &config.cancel_token);
    let mut app = App::new(repo, console, config);

    let result = match cli.load {
        Some(path) => app.load_snapshot(&path).and_then(|_| app.run()),
        None => app.run(),
    };

    match result {
        Ok(()) => {
            println!("Bye!");
            tracing::info!("session ended");
            Ok(())
        }
        Err(e) if is_end_of_input(&e) => {
            println!("[INFO] End of input detected.");
            tracing::info!("session ended at end of input");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "session aborted");
            Err(e)
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("customer_ledger=info"));

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
