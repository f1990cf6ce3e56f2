//! kittyctl - Kittygram maintenance commands.
//!
//! Out-of-band database maintenance: wiping the database and seeding it
//! with demo users, posts, and generated placeholder images.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kittygram_infra::database::{
    DatabaseConfig, PostgresPostRepository, PostgresUserRepository, connect,
};
use kittygram_infra::{Argon2PasswordService, FsMediaStore};

mod commands;

use commands::MaintenanceContext;

/// kittyctl - Kittygram maintenance commands
#[derive(Parser, Debug)]
#[command(name = "kittyctl")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Delete all posts and all users
    ClearDatabase {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Clear the database, then load demo users and posts with
    /// generated placeholder images
    LoadTestData,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let cli = Cli::parse();
    let ctx = build_context().await?;

    match cli.command {
        Commands::ClearDatabase { force } => commands::clear::run(&ctx, force).await,
        Commands::LoadTestData => commands::seed::run(&ctx).await,
    }
}

async fn build_context() -> Result<MaintenanceContext> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let media_root = std::env::var("MEDIA_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("media"));

    let config = DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
    };
    let db = connect(&config)
        .await
        .context("Failed to connect to database")?;

    Ok(MaintenanceContext {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db)),
        media: Arc::new(FsMediaStore::new(media_root)),
        passwords: Arc::new(Argon2PasswordService::new()),
    })
}
