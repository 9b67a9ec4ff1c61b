//! Folio CLI - admin seeding and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Ensure the default admin account exists (safe to repeat)
//! folio seed --password 'change-me-now'
//!
//! # Create another admin account
//! folio admin create -e editor@example.com -p 'another-secret'
//!
//! # Check the document store connection
//! folio ping
//! ```
//!
//! # Commands
//!
//! - `seed` - Idempotently create the default admin
//! - `admin create` - Create admin accounts
//! - `ping` - Verify `MONGO_URI` (or `atlas_URL`) is reachable

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use folio_server::services::auth::DEFAULT_ADMIN_EMAIL;

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Folio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default admin account if it does not exist
    Seed {
        /// Admin email address
        #[arg(short, long, default_value = DEFAULT_ADMIN_EMAIL)]
        email: String,

        /// Admin password
        #[arg(short, long, env = "ADMIN_SEED_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Check the document store connection
    Ping,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

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
        Commands::Seed { email, password } => {
            commands::seed::admin(&email, &password).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password } => {
                commands::admin::create(&email, &password).await?;
            }
        },
        Commands::Ping => commands::ping().await?,
    }
    Ok(())
}
