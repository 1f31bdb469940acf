//! photos-folder-sync: one-shot sync of a local directory into a Google
//! Photos album.
//!
//! Authenticates with an OAuth refresh token, finds (or creates) the target
//! album, then uploads every file whose name the album does not already hold.
//! Files are matched by base filename only.

#![warn(clippy::all)]

mod auth;
mod cli;
mod config;
mod photos;
mod shutdown;
mod sync;
mod types;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use photos::{GooglePhotosClient, PhotosLibrary};

/// Build the HTTP client shared by the token exchange and the Photos API.
fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Print every album the account owns, one per line.
async fn run_list_albums(library: &dyn PhotosLibrary) -> anyhow::Result<()> {
    let albums = library.list_albums().await?;
    if albums.is_empty() {
        println!("No albums found.");
        return Ok(());
    }
    for album in &albums {
        println!("{} ({} items)", album.title, album.item_count());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::info!("Starting photos-folder-sync");
    tracing::debug!(?config, "Resolved configuration");

    let http = build_http_client(config.timeout)?;
    let token = auth::authenticate(&http, &config.credential_file).await?;
    let library = GooglePhotosClient::new(http, token);

    if config.list_albums {
        return run_list_albums(&library).await;
    }

    let shutdown_token = shutdown::install_signal_handler()?;
    let sync_config = config.sync_config();
    let summary = sync::run_sync(&library, &sync_config, shutdown_token).await?;

    if summary.failed() > 0 {
        tracing::warn!(
            "{} files could not be synced; re-run to retry them",
            summary.failed()
        );
    }
    Ok(())
}
