//! Store Onboarding CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ob-cli migrate
//!
//! # Seed stores from YAML (validate and preview only)
//! ob-cli seed stores stores.yaml --dry-run
//!
//! # Check a name against stores already in a region
//! ob-cli stores check-duplicates -n "Corner Cafe" -r Gauteng
//!
//! # Normalize a timestamp the way the API does
//! ob-cli timestamp parse "2024-03-01" --pattern "%d %b %Y"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed stores` - Insert stores from a YAML file
//! - `stores check-duplicates` - Ad-hoc duplicate check
//! - `timestamp parse` - Parse and format a timestamp

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ob-cli")]
#[command(author, version, about = "Store onboarding CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect stores
    Stores {
        #[command(subcommand)]
        action: StoresAction,
    },
    /// Timestamp utilities
    Timestamp {
        #[command(subcommand)]
        action: TimestampAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert stores from a YAML file
    Stores {
        /// Path to the YAML file
        file: String,

        /// Validate and report duplicates without touching the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum StoresAction {
    /// Check a store name against existing stores in a region
    CheckDuplicates {
        /// Store name
        #[arg(short, long)]
        name: String,

        /// Region, exactly as stored (e.g. "Western Cape")
        #[arg(short, long)]
        region: String,

        /// Store ID to leave out of the results
        #[arg(short = 'x', long)]
        exclude: Option<String>,
    },
}

#[derive(Subcommand)]
enum TimestampAction {
    /// Parse a timestamp and show its canonical and display forms
    Parse {
        /// Date string, or canonical JSON such as '{"seconds":0,"nanoseconds":0}'
        value: String,

        /// `strftime` pattern for the display form
        #[arg(short, long)]
        pattern: Option<String>,
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
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Stores { file, dry_run } => commands::seed::stores(&file, dry_run).await?,
        },
        Commands::Stores { action } => match action {
            StoresAction::CheckDuplicates {
                name,
                region,
                exclude,
            } => commands::stores::check_duplicates(&name, &region, exclude.as_deref()).await?,
        },
        Commands::Timestamp { action } => match action {
            TimestampAction::Parse { value, pattern } => {
                commands::timestamp::parse(&value, pattern.as_deref());
            }
        },
    }
    Ok(())
}
