//! Wire types for the Photos Library API v1.

use serde::{Deserialize, Serialize};

/// An album as returned by `albums.list` / `albums.create`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// int64 values are transported as decimal strings.
    #[serde(default)]
    pub media_items_count: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub is_writeable: Option<bool>,
}

impl Album {
    /// Number of items in the album; unknown or malformed counts read as 0.
    pub fn item_count(&self) -> u64 {
        self.media_items_count
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0)
    }
}

/// Response from `GET /albums`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlbumsResponse {
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateAlbumRequest<'a> {
    pub album: NewAlbum<'a>,
}

#[derive(Debug, Serialize)]
pub struct NewAlbum<'a> {
    pub title: &'a str,
}

/// Request body for `POST /mediaItems:search`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMediaItemsRequest<'a> {
    pub album_id: &'a str,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

/// Media item fields this crate reads. Everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub filename: String,
}

/// Response from `POST /mediaItems:search`. An album with no items yields `{}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMediaItemsResponse {
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Where newly created items land inside the album.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionType {
    FirstInAlbum,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AlbumPosition {
    pub position: PositionType,
}

impl AlbumPosition {
    pub fn first_in_album() -> Self {
        Self {
            position: PositionType::FirstInAlbum,
        }
    }
}

/// One-time handle to bytes uploaded via `POST /uploads`. Consumed when the
/// media item is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadToken(String);

impl UploadToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// One entry of `newMediaItems` in a batch-create call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItem {
    pub description: String,
    pub simple_media_item: SimpleMediaItem,
}

impl NewMediaItem {
    /// Pair an upload token with the item's caption and display filename.
    pub fn from_upload(token: UploadToken, file_name: &str, description: &str) -> Self {
        Self {
            description: description.to_string(),
            simple_media_item: SimpleMediaItem {
                upload_token: token.0,
                file_name: file_name.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMediaItem {
    pub upload_token: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateMediaItemsRequest<'a> {
    pub album_id: &'a str,
    pub new_media_items: &'a [NewMediaItem],
    pub album_position: AlbumPosition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateMediaItemsResponse {
    #[serde(default)]
    pub new_media_item_results: Vec<NewMediaItemResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItemResult {
    #[serde(default)]
    pub upload_token: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub media_item: Option<MediaItem>,
}

/// `google.rpc.Status`; a missing or zero code means OK.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Error envelope returned alongside non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
