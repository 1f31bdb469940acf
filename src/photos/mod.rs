//! Photos Library service: album directory, byte uploads and media item
//! creation against Google's Photos Library API v1.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

pub use client::GooglePhotosClient;
pub use error::PhotosError;
pub use types::{Album, AlbumPosition, MediaItem, NewMediaItem, UploadToken};

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;

/// Remote capabilities the sync run depends on.
///
/// Object-safe so the orchestrator can take `&dyn PhotosLibrary`; tests drive
/// it with an in-memory implementation.
#[async_trait]
pub trait PhotosLibrary: Send + Sync {
    /// All albums owned by the caller, across every result page.
    async fn list_albums(&self) -> Result<Vec<Album>, PhotosError>;

    /// Create an album. Not idempotent: two calls create two albums.
    async fn create_album(&self, title: &str) -> Result<Album, PhotosError>;

    /// Filenames of every media item currently in the album.
    async fn list_media_filenames(&self, album_id: &str) -> Result<HashSet<String>, PhotosError>;

    /// Upload the bytes of `path`, presented to the service as `file_name`.
    async fn upload_bytes(&self, path: &Path, file_name: &str) -> Result<UploadToken, PhotosError>;

    /// Turn uploaded bytes into media items inside `album_id`.
    ///
    /// Fails if any item in the batch is rejected.
    async fn batch_create_media_items(
        &self,
        album_id: &str,
        items: &[NewMediaItem],
        position: AlbumPosition,
    ) -> Result<Vec<MediaItem>, PhotosError>;
}

/// First album whose title equals `title` exactly (case-sensitive).
///
/// Returns `Ok(None)` when no album matches. When several albums share the
/// title, the first in listing order wins and a warning is logged.
pub async fn find_album_by_title(
    library: &dyn PhotosLibrary,
    title: &str,
) -> Result<Option<Album>, PhotosError> {
    let albums = library.list_albums().await?;
    let mut matches = albums.into_iter().filter(|a| a.title == title);
    let first = matches.next();
    let extra = matches.count();
    if extra > 0 {
        tracing::warn!(
            "{} albums are titled '{}'; using the first one listed",
            extra + 1,
            title
        );
    }
    Ok(first)
}
