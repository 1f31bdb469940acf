use std::path::PathBuf;

use thiserror::Error;

/// Errors from the Photos Library API collaborator.
#[derive(Debug, Error)]
pub enum PhotosError {
    #[error("Photos API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Upload of {0} returned an empty upload token")]
    EmptyUploadToken(String),

    #[error("Media item creation failed: {0}")]
    ItemRejected(String),

    #[error("Cannot read {path}: {source}")]
    LocalFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PhotosError {
    /// Build an [`PhotosError::Api`] from a failed response body, preferring the
    /// message inside Google's JSON error envelope.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<super::types::ErrorEnvelope>(body) {
            Ok(env) => match env.error.status {
                Some(code) if !env.error.message.is_empty() => {
                    format!("{}: {}", code, env.error.message)
                }
                Some(code) => code,
                None => env.error.message,
            },
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.trim().to_string(),
        };
        Self::Api { status, message }
    }
}
