//! In-memory [`PhotosLibrary`] used by unit tests.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::PhotosError;
use super::types::{Album, AlbumPosition, MediaItem, NewMediaItem, PositionType, UploadToken};
use super::PhotosLibrary;

#[derive(Debug)]
pub(crate) struct FakeAlbum {
    pub album: Album,
    /// Filenames in display order, first item first.
    pub items: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    albums: Vec<FakeAlbum>,
    /// Uploaded but not yet (or never) attached: token -> filename.
    library: Vec<(String, String)>,
    uploads: Vec<String>,
    create_album_calls: usize,
    attach_calls: usize,
    next_id: usize,
}

/// Records every call so tests can assert on side effects.
#[derive(Debug, Default)]
pub(crate) struct FakeLibrary {
    pub(crate) state: Mutex<State>,
    pub fail_list_albums: bool,
    pub fail_create_album: bool,
    pub fail_list_media: bool,
    /// Filenames whose upload fails.
    pub fail_upload: HashSet<String>,
    /// Filenames whose attach fails.
    pub fail_attach: HashSet<String>,
    /// Cancelled while the first upload is in flight, as a signal would be.
    pub cancel_during_upload: Option<CancellationToken>,
}

fn api_error(message: &str) -> PhotosError {
    PhotosError::Api {
        status: 500,
        message: message.to_string(),
    }
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_album(self, id: &str, title: &str, items: &[&str]) -> Self {
        self.state.lock().unwrap().albums.push(FakeAlbum {
            album: Album {
                id: id.to_string(),
                title: title.to_string(),
                media_items_count: Some(items.len().to_string()),
                product_url: None,
                is_writeable: Some(true),
            },
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn album_items(&self, title: &str) -> Option<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .albums
            .iter()
            .find(|a| a.album.title == title)
            .map(|a| a.items.clone())
    }

    pub fn album_count(&self, title: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.albums.iter().filter(|a| a.album.title == title).count()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// Uploaded bytes never attached to any album.
    pub fn orphans(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.library.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn create_album_calls(&self) -> usize {
        self.state.lock().unwrap().create_album_calls
    }

    pub fn attach_calls(&self) -> usize {
        self.state.lock().unwrap().attach_calls
    }
}

#[async_trait]
impl PhotosLibrary for FakeLibrary {
    async fn list_albums(&self) -> Result<Vec<Album>, PhotosError> {
        if self.fail_list_albums {
            return Err(api_error("albums.list unavailable"));
        }
        let state = self.state.lock().unwrap();
        Ok(state.albums.iter().map(|a| a.album.clone()).collect())
    }

    async fn create_album(&self, title: &str) -> Result<Album, PhotosError> {
        let mut state = self.state.lock().unwrap();
        state.create_album_calls += 1;
        if self.fail_create_album {
            return Err(api_error("albums.create failed"));
        }
        state.next_id += 1;
        let album = Album {
            id: format!("created-{}", state.next_id),
            title: title.to_string(),
            media_items_count: None,
            product_url: None,
            is_writeable: Some(true),
        };
        state.albums.push(FakeAlbum {
            album: album.clone(),
            items: Vec::new(),
        });
        Ok(album)
    }

    async fn list_media_filenames(&self, album_id: &str) -> Result<HashSet<String>, PhotosError> {
        if self.fail_list_media {
            return Err(api_error("mediaItems.search failed"));
        }
        let state = self.state.lock().unwrap();
        let album = state
            .albums
            .iter()
            .find(|a| a.album.id == album_id)
            .ok_or_else(|| api_error("no such album"))?;
        Ok(album.items.iter().cloned().collect())
    }

    async fn upload_bytes(&self, path: &Path, file_name: &str) -> Result<UploadToken, PhotosError> {
        if let Some(token) = &self.cancel_during_upload {
            token.cancel();
        }
        let mut state = self.state.lock().unwrap();
        state.uploads.push(file_name.to_string());
        if self.fail_upload.contains(file_name) {
            return Err(api_error("upload rejected"));
        }
        if !path.is_file() {
            return Err(PhotosError::LocalFile {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        state.next_id += 1;
        let token = format!("token-{}", state.next_id);
        state.library.push((token.clone(), file_name.to_string()));
        Ok(UploadToken::new(token))
    }

    async fn batch_create_media_items(
        &self,
        album_id: &str,
        items: &[NewMediaItem],
        position: AlbumPosition,
    ) -> Result<Vec<MediaItem>, PhotosError> {
        let mut state = self.state.lock().unwrap();
        state.attach_calls += 1;

        let mut created = Vec::new();
        for item in items {
            let token = &item.simple_media_item.upload_token;
            let idx = state
                .library
                .iter()
                .position(|(t, _)| t == token)
                .ok_or_else(|| api_error("unknown upload token"))?;
            let name = state.library[idx].1.clone();
            if self.fail_attach.contains(&name) {
                return Err(api_error("batchCreate failed"));
            }
            state.library.remove(idx);

            let album = state
                .albums
                .iter_mut()
                .find(|a| a.album.id == album_id)
                .ok_or_else(|| api_error("no such album"))?;
            match position.position {
                PositionType::FirstInAlbum => album.items.insert(0, name.clone()),
            }
            created.push(MediaItem {
                id: format!("item-{}", name),
                filename: name,
            });
        }
        Ok(created)
    }
}
