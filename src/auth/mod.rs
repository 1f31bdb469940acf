//! OAuth access for the Photos Library API.
//!
//! The credential file carries a long-lived refresh token; at startup it is
//! exchanged for a short-lived bearer token that covers a single sync run.

pub mod credentials;
pub mod error;

use std::path::Path;

use serde::Deserialize;

pub use credentials::AuthorizedUser;
pub use error::AuthError;

/// Environment variable that supplies a ready bearer token, bypassing the
/// refresh exchange.
pub const ACCESS_TOKEN_ENV: &str = "PHOTOS_ACCESS_TOKEN";

/// Bearer token sent with every Photos Library request.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange the refresh token held by `creds` for an access token.
pub async fn refresh_access_token(
    client: &reqwest::Client,
    creds: &AuthorizedUser,
) -> Result<AccessToken, AuthError> {
    let refresh_token = creds.refresh_token.as_deref().unwrap_or_default();
    let params = [
        ("grant_type", "refresh_token"),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("refresh_token", refresh_token),
    ];

    tracing::debug!(token_uri = creds.token_uri(), "Refreshing access token");
    let response = client.post(creds.token_uri()).form(&params).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(e) => match e.error_description {
                Some(desc) => format!("{}: {}", e.error, desc),
                None => e.error,
            },
            Err(_) => body,
        };
        return Err(AuthError::TokenRejected {
            code: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = serde_json::from_str(&body).map_err(|e| AuthError::TokenRejected {
        code: status.as_u16(),
        message: format!("unexpected token response: {e}"),
    })?;
    if let Some(secs) = token.expires_in {
        tracing::debug!("Access token valid for {}s", secs);
    }
    Ok(AccessToken(token.access_token))
}

/// Resolve the access token for this run.
///
/// A non-empty [`ACCESS_TOKEN_ENV`] wins; otherwise the credential file is
/// loaded and its refresh token exchanged.
pub async fn authenticate(
    client: &reqwest::Client,
    credential_file: &Path,
) -> Result<AccessToken, AuthError> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.is_empty() {
            tracing::info!("Using access token from {}", ACCESS_TOKEN_ENV);
            return Ok(AccessToken::new(token));
        }
    }

    let creds = AuthorizedUser::load(credential_file).await?;
    tracing::info!(
        "Loaded credentials for client {} from {}",
        creds.client_id,
        credential_file.display()
    );
    let token = refresh_access_token(client, &creds).await?;
    tracing::info!("Authentication completed successfully");
    Ok(token)
}
