use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::error::PhotosError;
use super::types::{
    Album, AlbumPosition, BatchCreateMediaItemsRequest, BatchCreateMediaItemsResponse,
    CreateAlbumRequest, ListAlbumsResponse, MediaItem, NewAlbum, NewMediaItem, NewMediaItemResult,
    SearchMediaItemsRequest, SearchMediaItemsResponse, UploadToken,
};
use super::PhotosLibrary;
use crate::auth::AccessToken;

const API_BASE: &str = "https://photoslibrary.googleapis.com/v1";

/// `albums.list` caps pageSize at 50.
const ALBUM_PAGE_SIZE: u32 = 50;

/// `mediaItems.search` caps pageSize at 100.
const MEDIA_PAGE_SIZE: u32 = 100;

/// Photos Library API client authenticated with a single bearer token.
pub struct GooglePhotosClient {
    http: Client,
    token: AccessToken,
    base_url: String,
}

impl std::fmt::Debug for GooglePhotosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GooglePhotosClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GooglePhotosClient {
    pub fn new(http: Client, token: AccessToken) -> Self {
        Self {
            http,
            token,
            base_url: API_BASE.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an authorized request and decode the JSON body.
    ///
    /// The API answers some successful calls with an empty body, which is
    /// decoded as `{}`.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PhotosError> {
        let response = request.bearer_auth(self.token.as_str()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PhotosError::from_response(status.as_u16(), &body));
        }
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}

#[async_trait]
impl PhotosLibrary for GooglePhotosClient {
    async fn list_albums(&self) -> Result<Vec<Album>, PhotosError> {
        let mut albums = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("pageSize", ALBUM_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let request = self.http.get(self.url("/albums")).query(&query);
            let page: ListAlbumsResponse = self.send_json(request).await?;
            debug!("albums.list returned {} albums", page.albums.len());
            albums.extend(page.albums);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(albums)
    }

    async fn create_album(&self, title: &str) -> Result<Album, PhotosError> {
        let body = CreateAlbumRequest {
            album: NewAlbum { title },
        };
        let request = self.http.post(self.url("/albums")).json(&body);
        self.send_json(request).await
    }

    async fn list_media_filenames(&self, album_id: &str) -> Result<HashSet<String>, PhotosError> {
        let mut filenames = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let body = SearchMediaItemsRequest {
                album_id,
                page_size: MEDIA_PAGE_SIZE,
                page_token: page_token.as_deref(),
            };
            let request = self.http.post(self.url("/mediaItems:search")).json(&body);
            let page: SearchMediaItemsResponse = self.send_json(request).await?;
            debug!(
                "mediaItems.search returned {} items for album {}",
                page.media_items.len(),
                album_id
            );
            filenames.extend(page.media_items.into_iter().map(|item| item.filename));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(filenames)
    }

    async fn upload_bytes(&self, path: &Path, file_name: &str) -> Result<UploadToken, PhotosError> {
        let local_err = |source| PhotosError::LocalFile {
            path: path.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(path).await.map_err(local_err)?;
        let size = file.metadata().await.map_err(local_err)?.len();

        // Stream from disk; large videos never sit in memory.
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let response = self
            .http
            .post(self.url("/uploads"))
            .bearer_auth(self.token.as_str())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("X-Goog-Upload-File-Name", file_name)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PhotosError::from_response(status.as_u16(), &body));
        }

        let token = body.trim();
        if token.is_empty() {
            return Err(PhotosError::EmptyUploadToken(file_name.to_string()));
        }
        debug!(size_bytes = size, file = file_name, "upload complete");
        Ok(UploadToken::new(token))
    }

    async fn batch_create_media_items(
        &self,
        album_id: &str,
        items: &[NewMediaItem],
        position: AlbumPosition,
    ) -> Result<Vec<MediaItem>, PhotosError> {
        let body = BatchCreateMediaItemsRequest {
            album_id,
            new_media_items: items,
            album_position: position,
        };
        let request = self.http.post(self.url("/mediaItems:batchCreate")).json(&body);
        let response: BatchCreateMediaItemsResponse = self.send_json(request).await?;

        confirmed_items(items, response.new_media_item_results)
    }
}

/// Match batch-create results back to the items sent.
///
/// Results are keyed by upload token, falling back to position when the
/// token is not echoed. Every sent item must come back with an OK status and
/// a media item; anything else, including a missing result, rejects the call.
fn confirmed_items(
    items: &[NewMediaItem],
    results: Vec<NewMediaItemResult>,
) -> Result<Vec<MediaItem>, PhotosError> {
    let mut created = Vec::with_capacity(results.len());
    let mut rejected = Vec::new();
    let mut answered: HashSet<String> = HashSet::new();

    for (idx, result) in results.into_iter().enumerate() {
        let token = result
            .upload_token
            .or_else(|| items.get(idx).map(|i| i.simple_media_item.upload_token.clone()));
        let file_name = token
            .as_deref()
            .and_then(|t| items.iter().find(|i| i.simple_media_item.upload_token == t))
            .map(|i| i.simple_media_item.file_name.clone())
            .unwrap_or_else(|| "<unknown>".to_string());
        if let Some(t) = token {
            answered.insert(t);
        }

        let status = result.status.unwrap_or_default();
        match result.media_item {
            Some(item) if status.is_ok() => created.push(item),
            _ => {
                let message = if status.message.is_empty() {
                    "no media item returned".to_string()
                } else {
                    status.message
                };
                rejected.push(format!("{}: {}", file_name, message));
            }
        }
    }

    for item in items {
        if !answered.contains(&item.simple_media_item.upload_token) {
            rejected.push(format!(
                "{}: no result returned",
                item.simple_media_item.file_name
            ));
        }
    }

    if !rejected.is_empty() {
        return Err(PhotosError::ItemRejected(rejected.join("; ")));
    }
    Ok(created)
}
