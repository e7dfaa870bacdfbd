//! shipclip: copy a shipping destination between browser tabs.
//!
//! Main entry point for the shipclip CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use shipclip_core::{
    Browser, Config, CopyError, FileHandoffStore, HandoffStore, copy_destination,
    paste_destination,
};

/// shipclip CLI.
#[derive(Parser)]
#[command(name = "shipclip")]
#[command(about = "Copies a shipping destination from an order page into a label-printing form")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the destination from the order page and store it
    Copy,

    /// Fill the label form from the stored destination
    Paste,

    /// Print the stored destination record
    Show,

    /// List the browser's debuggable tabs
    Pages,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shipclip=info")))
        .with(fmt::layer().with_target(false))
        .init();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = FileHandoffStore::new(config.store.get_path());

    let result = match cli.command {
        Commands::Copy => run_copy(&config, &store).await,
        Commands::Paste => run_paste(&config, &store).await,
        Commands::Show => run_show(&store).await,
        Commands::Pages => run_pages(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the config file, falling back to defaults when the default
/// path simply isn't there.
fn load_config(path: &PathBuf) -> Result<Config, CopyError> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        info!("no config at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

async fn run_copy(config: &Config, store: &FileHandoffStore) -> Result<(), CopyError> {
    info!("copying destination…");
    let summary = copy_destination(config, store).await?;

    let r = &summary.record;
    println!(
        "Copied {} {} - {}, {}, {} {} {} (order #{})",
        r.first_name, r.last_name, r.address1, r.city, r.state, r.postal_code, r.country,
        if r.order_number.is_empty() { "?" } else { r.order_number.as_str() }
    );
    Ok(())
}

async fn run_paste(config: &Config, store: &FileHandoffStore) -> Result<(), CopyError> {
    info!("pasting destination…");
    let summary = paste_destination(config, store).await?;

    println!(
        "Pasted {}/{} fields (copied at {})",
        summary.fields_written,
        summary.fields_planned,
        summary.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

async fn run_show(store: &FileHandoffStore) -> Result<(), CopyError> {
    match store.load().await? {
        Some(slip) => {
            println!("saved at: {}", slip.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!(
                "{}",
                serde_json::to_string_pretty(&slip.destination)
                    .unwrap_or_else(|_| "<unprintable>".to_string())
            );
            Ok(())
        }
        None => Err(CopyError::NothingCopied),
    }
}

async fn run_pages(config: &Config) -> Result<(), CopyError> {
    let browser = Browser::connect(config.browser.clone()).await?;

    for page in browser.pages().await? {
        if page.page_type == "page" {
            println!("{}  {}", page.title, page.url);
        }
    }
    Ok(())
}
