use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read credential file {path}: {source}")]
    ReadCredentials {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid credential file {path}: {source}")]
    ParseCredentials {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Credential file {0} has no refresh_token; authorize the client once and save an authorized-user file")]
    MissingRefreshToken(PathBuf),

    #[error("Token endpoint rejected refresh (HTTP {code}): {message}")]
    TokenRejected { code: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
