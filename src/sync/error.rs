use thiserror::Error;

use crate::photos::PhotosError;

/// Failures that abort a sync run. Per-file upload and attach failures are
/// not represented here; they are counted in the run summary instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to look up album '{title}': {source}")]
    AlbumLookup { title: String, source: PhotosError },

    #[error("Failed to create album '{title}': {source}")]
    CreateAlbum { title: String, source: PhotosError },

    #[error("Failed to list items already in album '{title}': {source}")]
    ListRemote { title: String, source: PhotosError },
}
