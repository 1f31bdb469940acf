use std::path::Path;

use serde::Deserialize;

use super::error::AuthError;

pub(crate) const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth "authorized user" credentials as written by Google's client
/// libraries after the consent flow has been completed once.
///
/// Also accepts the `installed` / `web` client-secret wrapper, in which case
/// the refresh token has to be present alongside the client fields.
#[derive(Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialFile {
    Installed { installed: AuthorizedUser },
    Web { web: AuthorizedUser },
    Flat(AuthorizedUser),
}

impl AuthorizedUser {
    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    /// Parse credentials from a JSON document.
    pub fn from_json(contents: &str, path: &Path) -> Result<Self, AuthError> {
        let file: CredentialFile =
            serde_json::from_str(contents).map_err(|source| AuthError::ParseCredentials {
                path: path.to_path_buf(),
                source,
            })?;
        let creds = match file {
            CredentialFile::Installed { installed } => installed,
            CredentialFile::Web { web } => web,
            CredentialFile::Flat(flat) => flat,
        };
        if creds.refresh_token.as_deref().is_none_or(str::is_empty) {
            return Err(AuthError::MissingRefreshToken(path.to_path_buf()));
        }
        Ok(creds)
    }

    /// Load credentials from disk.
    pub async fn load(path: &Path) -> Result<Self, AuthError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| AuthError::ReadCredentials {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_json(&contents, path)
    }
}
