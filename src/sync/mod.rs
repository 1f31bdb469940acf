//! Sync engine. One pass that makes sure the target album exists, diffs the
//! sync directory against the album by filename, then uploads and attaches
//! each missing file in turn.
//!
//! Files are processed sequentially. Every item is attached "first in album",
//! so after a multi-file run the album shows them in reverse processing order.

pub mod error;
pub mod local;
pub mod reconcile;

pub use error::SyncError;
pub use local::LocalFile;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use crate::photos::{self, Album, AlbumPosition, NewMediaItem, PhotosError, PhotosLibrary};

/// Subset of application config consumed by the sync engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub(crate) directory: PathBuf,
    pub(crate) album_title: String,
    pub(crate) description: String,
    pub(crate) dry_run: bool,
    pub(crate) no_progress_bar: bool,
}

/// What a single run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// `None` only in dry-run mode when the album does not exist yet.
    pub album_id: Option<String>,
    pub album_created: bool,
    pub local_files: usize,
    pub already_present: usize,
    /// Files the diff selected for upload.
    pub planned: usize,
    pub uploaded: usize,
    /// Files whose upload failed; nothing was created remotely.
    pub upload_failed: Vec<PathBuf>,
    /// Files uploaded but not attached; their bytes sit outside the album.
    pub attach_failed: Vec<PathBuf>,
    /// Files not started because shutdown was requested.
    pub skipped: usize,
}

impl SyncSummary {
    pub fn failed(&self) -> usize {
        self.upload_failed.len() + self.attach_failed.len()
    }
}

/// Result of the upload-then-attach step for one file.
enum FileOutcome {
    Uploaded,
    UploadFailed(PhotosError),
    AttachFailed(PhotosError),
}

/// Create a progress bar with a consistent template.
///
/// Hidden when the user passed `--no-progress-bar` or stdout is not a TTY.
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    match ProgressStyle::with_template(
        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    ) {
        Ok(style) => pb.set_style(style.progress_chars("=> ")),
        Err(e) => tracing::debug!("Progress template rejected: {}", e),
    }
    pb
}

/// Find the album by title, creating it when absent.
///
/// In dry-run mode a missing album is reported and `None` returned instead.
async fn ensure_album(
    library: &dyn PhotosLibrary,
    config: &SyncConfig,
) -> Result<(Option<Album>, bool), SyncError> {
    let title = &config.album_title;
    let existing = photos::find_album_by_title(library, title)
        .await
        .map_err(|source| SyncError::AlbumLookup {
            title: title.clone(),
            source,
        })?;

    if let Some(album) = existing {
        tracing::info!("Found album '{}' with {} items", album.title, album.item_count());
        if album.is_writeable == Some(false) {
            tracing::warn!(
                "Album '{}' is not writeable by this client; attaching items will likely fail",
                album.title
            );
        }
        return Ok((Some(album), false));
    }

    if config.dry_run {
        tracing::info!("[DRY RUN] Would create album '{}'", title);
        return Ok((None, false));
    }

    tracing::info!("Creating album '{}' because it does not exist", title);
    let album = library
        .create_album(title)
        .await
        .map_err(|source| SyncError::CreateAlbum {
            title: title.clone(),
            source,
        })?;
    if let Some(url) = &album.product_url {
        tracing::info!("Created album '{}': {}", album.title, url);
    }
    Ok((Some(album), true))
}

/// Upload one file and attach it to the album on its own.
async fn upload_and_attach(
    library: &dyn PhotosLibrary,
    album_id: &str,
    file: &LocalFile,
    description: &str,
) -> FileOutcome {
    tracing::debug!(path = %file.path.display(), "uploading");
    let token = match library.upload_bytes(&file.path, &file.name).await {
        Ok(t) => t,
        Err(e) => return FileOutcome::UploadFailed(e),
    };
    tracing::debug!("Received upload token for {}", file.name);

    let item = NewMediaItem::from_upload(token, &file.name, description);
    match library
        .batch_create_media_items(album_id, &[item], AlbumPosition::first_in_album())
        .await
    {
        Ok(created) => {
            for media in &created {
                tracing::debug!("Created media item {} for {}", media.id, media.filename);
            }
            FileOutcome::Uploaded
        }
        Err(e) => FileOutcome::AttachFailed(e),
    }
}

/// Run a single sync pass.
///
/// Fatal errors (album lookup, album creation, listing the album) abort
/// before any upload. A missing or unreadable sync directory is logged and
/// treated as empty. Upload and attach failures are logged per file and
/// never stop the run; nothing is retried.
pub async fn run_sync(
    library: &dyn PhotosLibrary,
    config: &SyncConfig,
    shutdown_token: CancellationToken,
) -> Result<SyncSummary, SyncError> {
    let started = Instant::now();

    let (album, album_created) = ensure_album(library, config).await?;
    let mut summary = SyncSummary {
        album_id: album.as_ref().map(|a| a.id.clone()),
        album_created,
        ..SyncSummary::default()
    };

    let list_local = async {
        match local::list_local_files(&config.directory).await {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(
                    "Can't read files from directory {}: {}",
                    config.directory.display(),
                    e
                );
                Vec::new()
            }
        }
    };
    let list_remote = async {
        match &album {
            Some(a) => library.list_media_filenames(&a.id).await,
            None => Ok(Default::default()),
        }
    };
    let (local_files, remote_names) = tokio::join!(list_local, list_remote);
    let remote_names = remote_names.map_err(|source| SyncError::ListRemote {
        title: config.album_title.clone(),
        source,
    })?;

    tracing::info!(
        "Found {} files in {}",
        local_files.len(),
        config.directory.display()
    );
    tracing::debug!(
        "Album '{}' holds {} distinct filenames",
        config.album_title,
        remote_names.len()
    );

    let to_upload = reconcile::files_to_upload(&local_files, &remote_names);
    summary.local_files = local_files.len();
    summary.already_present = reconcile::already_present(&local_files, &remote_names);
    summary.planned = to_upload.len();

    if to_upload.is_empty() {
        tracing::info!("No files will be uploaded; the album already has every filename");
        log_summary(config, &summary, started.elapsed());
        return Ok(summary);
    }
    tracing::info!("{} files need to be uploaded", to_upload.len());

    let album_id = match (&album, config.dry_run) {
        (Some(a), false) => a.id.as_str(),
        _ => {
            for file in &to_upload {
                tracing::info!("[DRY RUN] Would upload {}", file.path.display());
            }
            log_summary(config, &summary, started.elapsed());
            return Ok(summary);
        }
    };

    let pb = create_progress_bar(config.no_progress_bar, to_upload.len() as u64);
    for (idx, file) in to_upload.iter().enumerate() {
        if shutdown_token.is_cancelled() {
            summary.skipped = to_upload.len() - idx;
            pb.suspend(|| tracing::info!("Shutdown requested, stopping before {}", file.name));
            break;
        }
        pb.set_message(file.name.clone());

        match upload_and_attach(library, album_id, file, &config.description).await {
            FileOutcome::Uploaded => {
                summary.uploaded += 1;
                pb.suspend(|| tracing::info!("Uploaded {}", file.path.display()));
            }
            FileOutcome::UploadFailed(e) => {
                pb.suspend(|| {
                    tracing::error!("Upload failed, skipping {}: {}", file.path.display(), e)
                });
                summary.upload_failed.push(file.path.clone());
            }
            FileOutcome::AttachFailed(e) => {
                pb.suspend(|| {
                    tracing::error!(
                        "Uploaded {} but could not add it to album '{}'; the item stays in the library outside the album: {}",
                        file.path.display(),
                        config.album_title,
                        e
                    )
                });
                summary.attach_failed.push(file.path.clone());
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    log_summary(config, &summary, started.elapsed());
    Ok(summary)
}

fn log_summary(config: &SyncConfig, summary: &SyncSummary, elapsed: Duration) {
    if config.dry_run {
        tracing::info!("── Dry Run Summary ──");
        tracing::info!("  {} files would be uploaded", summary.planned);
    } else {
        tracing::info!("── Summary ──");
        tracing::info!(
            "  {} uploaded, {} failed, {} already in album",
            summary.uploaded,
            summary.failed(),
            summary.already_present
        );
        if !summary.attach_failed.is_empty() {
            tracing::warn!(
                "  {} uploaded but not added to the album",
                summary.attach_failed.len()
            );
        }
        if summary.skipped > 0 {
            tracing::info!("  {} skipped by shutdown", summary.skipped);
        }
    }
    tracing::info!("  {} local files scanned", summary.local_files);
    match &summary.album_id {
        Some(id) if summary.album_created => {
            tracing::info!("  album: {} (created, id {})", config.album_title, id)
        }
        Some(id) => tracing::info!("  album: {} (id {})", config.album_title, id),
        None => tracing::info!("  album: {} (not created)", config.album_title),
    }
    tracing::info!("  elapsed: {}", format_duration(elapsed));
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::fake::FakeLibrary;
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config(dir: &Path) -> SyncConfig {
        SyncConfig {
            directory: dir.to_path_buf(),
            album_title: "Wedding".to_string(),
            description: "Testing is my life".to_string(),
            dry_run: false,
            no_progress_bar: true,
        }
    }

    fn dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for f in files {
            let p = dir.path().join(f);
            if let Some(parent) = p.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&p, f.as_bytes()).unwrap();
        }
        dir
    }

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_uploads_only_new_files() {
        let dir = dir_with(&["a.jpg", "b.jpg"]);
        let lib = FakeLibrary::new().with_album("A1", "Wedding", &["a.jpg"]);

        let summary = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lib.uploads(), vec!["b.jpg"]);
        assert_eq!(lib.album_items("Wedding").unwrap(), vec!["b.jpg", "a.jpg"]);
        assert_eq!(lib.create_album_calls(), 0);
        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.local_files, 2);
        assert!(!summary.album_created);
    }

    #[tokio::test]
    async fn test_creates_missing_album_once() {
        let dir = dir_with(&["a.jpg"]);
        let lib = FakeLibrary::new().with_album("A9", "Holiday", &[]);

        let summary = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lib.create_album_calls(), 1);
        assert_eq!(lib.album_count("Wedding"), 1);
        assert_eq!(lib.album_items("Wedding").unwrap(), vec!["a.jpg"]);
        assert!(summary.album_created);
        assert_eq!(summary.uploaded, 1);
        assert!(summary.album_id.is_some());
    }

    #[tokio::test]
    async fn test_second_run_uploads_nothing() {
        let dir = dir_with(&["a.jpg", "sub/b.jpg"]);
        let lib = FakeLibrary::new();
        let cfg = config(dir.path());

        run_sync(&lib, &cfg, CancellationToken::new()).await.unwrap();
        let second = run_sync(&lib, &cfg, CancellationToken::new()).await.unwrap();

        assert_eq!(lib.create_album_calls(), 1);
        assert_eq!(lib.uploads().len(), 2);
        assert_eq!(second.planned, 0);
        assert_eq!(second.already_present, 2);
    }

    #[tokio::test]
    async fn test_failed_upload_does_not_stop_run() {
        let dir = dir_with(&["a.jpg", "b.jpg"]);
        let lib = FakeLibrary {
            fail_upload: set(&["a.jpg"]),
            ..FakeLibrary::new()
        }
        .with_album("A1", "Wedding", &[]);

        let summary = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lib.uploads(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(lib.album_items("Wedding").unwrap(), vec!["b.jpg"]);
        assert_eq!(lib.attach_calls(), 1);
        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.upload_failed.len(), 1);
        assert!(summary.upload_failed[0].ends_with("a.jpg"));
    }

    #[tokio::test]
    async fn test_failed_attach_leaves_orphan_and_continues() {
        let dir = dir_with(&["a.jpg", "b.jpg"]);
        let lib = FakeLibrary {
            fail_attach: set(&["a.jpg"]),
            ..FakeLibrary::new()
        }
        .with_album("A1", "Wedding", &[]);

        let summary = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap();

        // a.jpg uploaded exactly once, never retried
        assert_eq!(lib.uploads(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(lib.orphans(), vec!["a.jpg"]);
        assert_eq!(lib.album_items("Wedding").unwrap(), vec!["b.jpg"]);
        assert_eq!(summary.attach_failed.len(), 1);
        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.failed(), 1);
    }

    #[tokio::test]
    async fn test_items_attached_first_in_album() {
        let dir = dir_with(&["1.jpg", "2.jpg", "3.jpg"]);
        let lib = FakeLibrary::new().with_album("A1", "Wedding", &["old.jpg"]);

        run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lib.uploads(), vec!["1.jpg", "2.jpg", "3.jpg"]);
        assert_eq!(
            lib.album_items("Wedding").unwrap(),
            vec!["3.jpg", "2.jpg", "1.jpg", "old.jpg"]
        );
        assert_eq!(lib.attach_calls(), 3);
    }

    #[tokio::test]
    async fn test_create_album_failure_is_fatal() {
        let dir = dir_with(&["a.jpg"]);
        let lib = FakeLibrary {
            fail_create_album: true,
            ..FakeLibrary::new()
        };

        let err = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::CreateAlbum { .. }));
        assert!(lib.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_album_lookup_failure_is_fatal() {
        let dir = dir_with(&["a.jpg"]);
        let lib = FakeLibrary {
            fail_list_albums: true,
            ..FakeLibrary::new()
        };

        let err = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::AlbumLookup { .. }));
        assert_eq!(lib.create_album_calls(), 0);
        assert!(lib.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_remote_listing_failure_is_fatal() {
        let dir = dir_with(&["a.jpg"]);
        let lib = FakeLibrary {
            fail_list_media: true,
            ..FakeLibrary::new()
        }
        .with_album("A1", "Wedding", &[]);

        let err = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::ListRemote { .. }));
        assert!(lib.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_uploads_nothing() {
        let dir = TempDir::new().unwrap();
        let lib = FakeLibrary::new().with_album("A1", "Wedding", &[]);
        let cfg = config(&dir.path().join("does-not-exist"));

        let summary = run_sync(&lib, &cfg, CancellationToken::new()).await.unwrap();

        assert_eq!(summary.local_files, 0);
        assert_eq!(summary.planned, 0);
        assert!(lib.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_upload_once() {
        let dir = dir_with(&["x/a.jpg", "y/a.jpg"]);
        let lib = FakeLibrary::new().with_album("A1", "Wedding", &[]);

        let summary = run_sync(&lib, &config(dir.path()), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(lib.uploads(), vec!["a.jpg"]);
        assert_eq!(summary.local_files, 2);
        assert_eq!(summary.planned, 1);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = dir_with(&["a.jpg", "b.jpg"]);
        let lib = FakeLibrary::new();
        let cfg = SyncConfig {
            dry_run: true,
            ..config(dir.path())
        };

        let summary = run_sync(&lib, &cfg, CancellationToken::new()).await.unwrap();

        assert_eq!(lib.create_album_calls(), 0);
        assert!(lib.uploads().is_empty());
        assert_eq!(summary.planned, 2);
        assert_eq!(summary.uploaded, 0);
        assert!(summary.album_id.is_none());
    }

    #[tokio::test]
    async fn test_dry_run_with_existing_album_diffs() {
        let dir = dir_with(&["a.jpg", "b.jpg"]);
        let lib = FakeLibrary::new().with_album("A1", "Wedding", &["a.jpg"]);
        let cfg = SyncConfig {
            dry_run: true,
            ..config(dir.path())
        };

        let summary = run_sync(&lib, &cfg, CancellationToken::new()).await.unwrap();

        assert_eq!(summary.planned, 1);
        assert_eq!(lib.attach_calls(), 0);
        assert!(lib.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_first_file_skips_all() {
        let dir = dir_with(&["a.jpg", "b.jpg"]);
        let lib = FakeLibrary::new().with_album("A1", "Wedding", &[]);
        let token = CancellationToken::new();
        token.cancel();

        let summary = run_sync(&lib, &config(dir.path()), token).await.unwrap();

        assert!(lib.uploads().is_empty());
        assert_eq!(summary.skipped, 2);
    }

    #[tokio::test]
    async fn test_cancel_mid_run_finishes_current_file_and_skips_rest() {
        let dir = dir_with(&["a.jpg", "b.jpg", "c.jpg"]);
        let token = CancellationToken::new();
        let lib = FakeLibrary {
            cancel_during_upload: Some(token.clone()),
            ..FakeLibrary::new()
        }
        .with_album("A1", "Wedding", &[]);

        let summary = run_sync(&lib, &config(dir.path()), token).await.unwrap();

        assert_eq!(lib.uploads(), vec!["a.jpg"]);
        assert_eq!(lib.album_items("Wedding").unwrap(), vec!["a.jpg"]);
        assert!(lib.orphans().is_empty());
        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed(), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 05s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 02m 05s");
    }
}
