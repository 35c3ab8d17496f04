//! Backoffice CLI - seeding and backend management tools.
//!
//! # Usage
//!
//! ```bash
//! # Check that the backend is reachable
//! backoffice-cli check
//!
//! # Validate a seed file without sending anything
//! backoffice-cli seed -f fixtures/seed.yaml --dry-run
//!
//! # Create every user and product in a seed file
//! backoffice-cli seed -f fixtures/seed.yaml --backend-url http://localhost:8000
//! ```
//!
//! # Commands
//!
//! - `check` - Probe the backend's `/health` endpoint
//! - `seed` - Create users and products from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "backoffice-cli")]
#[command(author, version, about = "Backoffice CLI tools")]
struct Cli {
    /// Backend base URL (defaults to `BACKEND_URL`)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend answers its health probe
    Check,
    /// Create users and products from a YAML seed file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: String,

        /// Validate the file without contacting the backend
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let backend_url = cli.backend_url.as_deref();
    match cli.command {
        Commands::Check => commands::check::health(backend_url).await?,
        Commands::Seed { file, dry_run } => {
            commands::seed::from_file(&file, backend_url, dry_run).await?;
        }
    }
    Ok(())
}
