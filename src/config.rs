use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
pub struct Config {
    pub credential_file: PathBuf,
    pub directory: PathBuf,
    pub album_title: String,
    pub description: String,

    pub timeout: Duration,

    pub list_albums: bool,
    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("credential_file", &self.credential_file)
            .field("directory", &self.directory)
            .field("album_title", &self.album_title)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

const DEFAULT_CREDENTIAL_FILE: &str = "credentials.json";
const DEFAULT_DIRECTORY: &str = "./pictures";
const DEFAULT_ALBUM: &str = "Wedding";
const DEFAULT_DESCRIPTION: &str = "Testing is my life";

/// An unset or empty setting falls back to `default`.
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let credential_file = or_default(cli.credential_file, DEFAULT_CREDENTIAL_FILE);
        let directory = or_default(cli.directory, DEFAULT_DIRECTORY);
        let album = or_default(cli.album, DEFAULT_ALBUM);
        let description = or_default(cli.description, DEFAULT_DESCRIPTION);

        if album.trim().is_empty() {
            anyhow::bail!("Album title must not be blank");
        }
        if cli.timeout == 0 {
            anyhow::bail!("--timeout must be at least 1 second");
        }

        Ok(Self {
            credential_file: expand_tilde(&credential_file),
            directory: expand_tilde(&directory),
            album_title: album,
            description,
            timeout: Duration::from_secs(cli.timeout),
            list_albums: cli.list_albums,
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        })
    }

    /// The immutable subset consumed by the sync orchestrator.
    pub fn sync_config(&self) -> crate::sync::SyncConfig {
        crate::sync::SyncConfig {
            directory: self.directory.clone(),
            album_title: self.album_title.clone(),
            description: self.description.clone(),
            dry_run: self.dry_run,
            no_progress_bar: self.no_progress_bar,
        }
    }
}
