use clap::Parser;

use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "photos-folder-sync",
    about = "Upload new files from a local directory into a Google Photos album"
)]
pub struct Cli {
    /// OAuth authorized-user JSON holding client id, secret and refresh token
    /// [default: credentials.json]
    #[arg(short = 'c', long, env = "CREDENTIAL_FILE")]
    pub credential_file: Option<String>,

    /// Local directory to sync, searched recursively [default: ./pictures]
    #[arg(short = 'd', long, env = "SYNC_DIRECTORY")]
    pub directory: Option<String>,

    /// Title of the album to sync into, created if missing [default: Wedding]
    #[arg(short = 'a', long, env = "ALBUM_NAME")]
    pub album: Option<String>,

    /// Description attached to every uploaded item [default: Testing is my life]
    #[arg(long, env = "ITEM_DESCRIPTION")]
    pub description: Option<String>,

    /// List available albums and exit
    #[arg(long)]
    pub list_albums: bool,

    /// Log what would be uploaded without touching the album
    #[arg(long)]
    pub dry_run: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}
