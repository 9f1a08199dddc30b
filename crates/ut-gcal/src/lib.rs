//! Google Calendar booking source for the utilization tracker.
//!
//! Loads OAuth client credentials and a stored token, refreshes the token
//! when it has expired, and lists the events of one calendar inside a
//! [`ReportWindow`]. The whole retrieval runs under a single timeout.

mod auth;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;
use ut_core::{RawEvent, ReportWindow};

pub use auth::{OAuthClient, Token};

/// Default upper bound for a complete retrieval.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const MAX_RESULTS: &str = "100";

/// Calendar retrieval errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credentials or token are missing or unreadable.
    #[error("invalid credentials: {0}")]
    Credentials(String),
    /// The provider rejected the token or the refresh.
    #[error("authorization rejected: {0}")]
    Unauthorized(String),
    /// The provider could not be reached.
    #[error("calendar source unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    /// The retrieval did not finish in time.
    #[error("calendar data retrieval timed out after {0:?}")]
    Timeout(Duration),
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse classification of a [`FetchError`] for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unreachable,
    Auth,
    Timeout,
    Other,
}

impl FetchError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Credentials(_) | Self::Unauthorized(_) => ErrorKind::Auth,
            Self::Unreachable(_) => ErrorKind::Unreachable,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::ClientBuild(_) | Self::Api { .. } | Self::InvalidResponse(_) => ErrorKind::Other,
        }
    }

    fn transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Unreachable(err)
        }
    }
}

/// Google Calendar client.
///
/// Holds the injected OAuth credentials; nothing else in the workspace
/// sees them.
pub struct Client {
    http: reqwest::Client,
    oauth: OAuthClient,
    token: Token,
    timeout: Duration,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("oauth", &self.oauth)
            .field("token", &self.token)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client from parsed credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(oauth: OAuthClient, token: Token, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            http,
            oauth,
            token,
            timeout,
        })
    }

    /// Creates a client from a `credentials.json` and a `token.json`.
    pub fn from_files(
        credentials_path: &Path,
        token_path: &Path,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let oauth = OAuthClient::from_file(credentials_path)?;
        tracing::info!(client_id = %oauth.client_id, "credentials loaded");
        let token = Token::from_file(token_path)?;
        tracing::info!(expiry = ?token.expiry, "token loaded");
        Self::new(oauth, token, timeout)
    }

    /// Lists the events of `calendar_id` inside `window`, oldest first.
    ///
    /// The token refresh and the listing together are bounded by the
    /// client's timeout.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        window: &ReportWindow,
    ) -> Result<Vec<RawEvent>, FetchError> {
        tokio::time::timeout(self.timeout, self.fetch(calendar_id, window))
            .await
            .unwrap_or_else(|_| Err(FetchError::Timeout(self.timeout)))
    }

    async fn fetch(
        &self,
        calendar_id: &str,
        window: &ReportWindow,
    ) -> Result<Vec<RawEvent>, FetchError> {
        let access_token = self.access_token().await?;
        let url = events_url(calendar_id)?;
        let time_min = window.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = window.end.to_rfc3339_opts(SecondsFormat::Secs, true);
        tracing::info!(calendar_id, start = %time_min, end = %time_max, "fetching calendar events");

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(&[
                ("showDeleted", "false"),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("maxResults", MAX_RESULTS),
            ])
            .send()
            .await
            .map_err(|err| FetchError::transport(err, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::transport(err, self.timeout))?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let page = parse_events_page(&body)?;
        if page.next_page_token.is_some() {
            tracing::warn!(
                max_results = MAX_RESULTS,
                "more events than fit in one page; later events are not included"
            );
        }
        tracing::info!(count = page.items.len(), "calendar events retrieved");
        Ok(page.items)
    }

    /// Returns a usable access token, refreshing the stored one if needed.
    async fn access_token(&self) -> Result<String, FetchError> {
        if !self.token.needs_refresh(Utc::now()) {
            return Ok(self.token.access_token.clone());
        }
        let Some(refresh_token) = self.token.refresh_token.as_deref() else {
            return Err(FetchError::Unauthorized(
                "token expired and has no refresh token".to_string(),
            ));
        };

        tracing::info!("refreshing access token");
        let response = self
            .http
            .post(&self.oauth.token_uri)
            .form(&[
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|err| FetchError::transport(err, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::transport(err, self.timeout))?;
        if !status.is_success() {
            // Any rejection of the refresh grant means the stored credentials are unusable.
            let message = parse_error_message(&body).unwrap_or_else(|| format!("status {status}"));
            return Err(FetchError::Unauthorized(message));
        }

        let refreshed = serde_json::from_str::<auth::RefreshResponse>(&body)
            .map_err(|err| FetchError::InvalidResponse(err.to_string()))?;
        Ok(refreshed.access_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<RawEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

fn events_url(calendar_id: &str) -> Result<reqwest::Url, FetchError> {
    let mut url = reqwest::Url::parse(CALENDAR_API_URL)
        .map_err(|err| FetchError::InvalidResponse(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| FetchError::InvalidResponse("calendar API URL cannot be a base".to_string()))?
        .extend(["calendars", calendar_id, "events"]);
    Ok(url)
}

fn parse_events_page(body: &str) -> Result<EventsPage, FetchError> {
    serde_json::from_str(body).map_err(|err| FetchError::InvalidResponse(err.to_string()))
}

fn status_error(status: reqwest::StatusCode, body: &str) -> FetchError {
    let message = parse_error_message(body).unwrap_or_else(|| format!("status {status}: {body}"));
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            FetchError::Unauthorized(message)
        }
        _ => FetchError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extracts the message from either error shape Google returns:
/// `{"error": {"message": ...}}` from APIs and
/// `{"error": "...", "error_description": ...}` from the token endpoint.
fn parse_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorPayload {
        Api {
            error: ApiError,
        },
        OAuth {
            error: String,
            error_description: Option<String>,
        },
    }

    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    match serde_json::from_str::<ErrorPayload>(body).ok()? {
        ErrorPayload::Api { error } => Some(error.message),
        ErrorPayload::OAuth {
            error,
            error_description: Some(description),
        } => Some(format!("{error}: {description}")),
        ErrorPayload::OAuth { error, .. } => Some(error),
    }
}
