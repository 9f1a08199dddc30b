//! OAuth client credentials and access tokens.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::FetchError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens expiring within this many seconds are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth client registration from a Google `credentials.json`.
#[derive(Clone, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl OAuthClient {
    /// Parses a credentials file of the "installed" or "web" application type.
    pub fn from_json(data: &[u8]) -> Result<Self, FetchError> {
        #[derive(Deserialize)]
        struct CredentialsFile {
            installed: Option<OAuthClient>,
            web: Option<OAuthClient>,
        }

        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchError::Credentials(
                "credentials file is empty".to_string(),
            ));
        }
        let file: CredentialsFile = serde_json::from_slice(data)
            .map_err(|err| FetchError::Credentials(format!("unable to parse credentials: {err}")))?;
        file.installed.or(file.web).ok_or_else(|| {
            FetchError::Credentials(
                "credentials contain neither an \"installed\" nor a \"web\" client".to_string(),
            )
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        Self::from_json(&read(path)?)
    }
}

/// A stored OAuth token.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let refresh_token = self.refresh_token.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &refresh_token)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl Token {
    pub fn from_json(data: &[u8]) -> Result<Self, FetchError> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchError::Credentials("token file is empty".to_string()));
        }
        let token: Self = serde_json::from_slice(data)
            .map_err(|err| FetchError::Credentials(format!("unable to parse token: {err}")))?;
        if token.access_token.is_empty() && token.refresh_token.is_none() {
            return Err(FetchError::Credentials(
                "token has neither an access token nor a refresh token".to_string(),
            ));
        }
        Ok(token)
    }

    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        Self::from_json(&read(path)?)
    }

    /// Whether the access token must be refreshed before use at `now`.
    ///
    /// A zero-valued expiry (`0001-01-01T00:00:00Z`) means the
    /// token does not expire.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        self.expiry
            .filter(|expiry| expiry.year() > 1)
            .is_some_and(|expiry| expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now)
    }
}

/// Successful response of the token endpoint.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

fn read(path: &Path) -> Result<Vec<u8>, FetchError> {
    std::fs::read(path)
        .map_err(|err| FetchError::Credentials(format!("unable to read {}: {err}", path.display())))
}
