//! Thin async client for the CodeStash REST and OAuth endpoints.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CodestashError, Result};

/// Upper bound on any single HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// -------------------------------------------------------------------
// Wire types
// -------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    #[serde(default)]
    pub verification_uri: String,
    #[serde(default)]
    pub verification_uri_complete: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub interval: i64,
}

impl DeviceCodeResponse {
    /// The URL to show the user. Falls back to the pre-filled URI when the
    /// plain one is blank.
    pub fn verification_target(&self) -> &str {
        match self.verification_uri.trim() {
            "" => self.verification_uri_complete.trim(),
            uri => uri,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    #[allow(dead_code)] // Always "Bearer" in practice; kept for diagnostics.
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

/// Error body returned by both the OAuth and the notes endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error", default)]
    pub code: String,
    #[serde(rename = "error_description", default)]
    pub description: Option<String>,
}

/// OAuth error codes the device flow distinguishes between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthErrorCode {
    AuthorizationPending,
    SlowDown,
    ExpiredToken,
    AccessDenied,
    Other(String),
}

impl OAuthErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "authorization_pending" => Self::AuthorizationPending,
            "slow_down" => Self::SlowDown,
            "expired_token" => Self::ExpiredToken,
            "access_denied" => Self::AccessDenied,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Outcome of one attempt to exchange a device code.
#[derive(Debug, Clone)]
pub enum TokenExchange {
    Granted(TokenResponse),
    Rejected(OAuthErrorCode),
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest {
    pub collection_id: String,
    pub folder_id: String,
    pub title: String,
    pub language: String,
    pub tags: Vec<String>,
    pub code: String,
    pub note: String,
}

#[derive(Debug, Deserialize)]
struct CreateNoteResponse {
    #[serde(default)]
    id: String,
}

/// Partial update. Only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    #[allow(dead_code)] // Deserialized for forward-compatibility; not rendered.
    pub language: String,
    #[serde(default)]
    #[allow(dead_code)] // Deserialized for forward-compatibility; not rendered.
    pub tags: Vec<String>,
    #[serde(default)]
    #[allow(dead_code)] // Deserialized for forward-compatibility; not rendered.
    pub snippet: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Keep only notes in `folder_id`. A blank folder id disables filtering.
pub fn filter_by_folder(notes: Vec<NoteSummary>, folder_id: &str) -> Vec<NoteSummary> {
    if folder_id.trim().is_empty() {
        return notes;
    }
    notes
        .into_iter()
        .filter(|n| n.folder_id.as_deref() == Some(folder_id))
        .collect()
}

// -------------------------------------------------------------------
// Client
// -------------------------------------------------------------------

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
}

impl ApiClient {
    pub fn new(base_url: &str, client_id: &str, client_secret: &str) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(CodestashError::InvalidArgument(
                "api base url is required".to_string(),
            ));
        }
        let base_url = Url::parse(base_url.trim()).map_err(|e| {
            CodestashError::InvalidArgument(format!("invalid api base url: {}", e))
        })?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = join_path(self.base_url.path(), endpoint);
        url.set_path(&path);
        url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.url(endpoint);
        tracing::debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    /// Request a device code for this client.
    pub async fn start_device_code(&self) -> Result<DeviceCodeResponse> {
        let body = serde_json::json!({ "client_id": self.client_id });
        let res = self
            .request(Method::POST, "/oauth/device/code")
            .json(&body)
            .send()
            .await?;
        let res = ensure_success(res).await?;
        decode_json(res).await
    }

    /// Try once to exchange `device_code` for a token.
    ///
    /// OAuth error responses are returned as [`TokenExchange::Rejected`]
    /// rather than as errors, so the caller can keep polling.
    pub async fn exchange_device_code(&self, device_code: &str) -> Result<TokenExchange> {
        let body = serde_json::json!({
            "grant_type": "device_code",
            "device_code": device_code,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
        });
        let res = self
            .request(Method::POST, "/oauth/token")
            .json(&body)
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(TokenExchange::Granted(decode_json(res).await?));
        }
        let err = decode_api_error(res).await?;
        tracing::debug!(
            "token exchange rejected: {} {}",
            err.code,
            err.description.as_deref().unwrap_or("")
        );
        Ok(TokenExchange::Rejected(OAuthErrorCode::parse(&err.code)))
    }

    /// List every note in a collection.
    pub async fn list_notes(
        &self,
        access_token: &str,
        collection_id: &str,
    ) -> Result<Vec<NoteSummary>> {
        let endpoint = format!("/api/collections/{}/notes", collection_id);
        let res = self
            .request(Method::GET, &endpoint)
            .bearer_auth(access_token)
            .send()
            .await?;
        let res = ensure_success(res).await?;
        Ok(decode_optional_json(res).await?.unwrap_or_default())
    }

    /// Create a note. Returns the new id, or `None` when the server sent
    /// back no body.
    pub async fn create_note(
        &self,
        access_token: &str,
        payload: &CreateNoteRequest,
    ) -> Result<Option<String>> {
        let endpoint = format!("/api/collections/{}/notes", payload.collection_id);
        let res = self
            .request(Method::POST, &endpoint)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;
        let res = ensure_success(res).await?;
        let created: Option<CreateNoteResponse> = decode_optional_json(res).await?;
        Ok(created.map(|c| c.id).filter(|id| !id.is_empty()))
    }

    pub async fn update_note(
        &self,
        access_token: &str,
        note_id: &str,
        patch: &UpdateNoteRequest,
    ) -> Result<()> {
        let endpoint = format!("/api/notes/{}", note_id);
        let res = self
            .request(Method::PATCH, &endpoint)
            .bearer_auth(access_token)
            .json(patch)
            .send()
            .await?;
        ensure_success(res).await?;
        Ok(())
    }
}

// -------------------------------------------------------------------
// Response helpers
// -------------------------------------------------------------------

/// Join an endpoint onto a base path without doubling or dropping slashes.
pub fn join_path(base_path: &str, endpoint: &str) -> String {
    if endpoint.is_empty() {
        return base_path.to_string();
    }
    let base = base_path.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    }
}

/// Parse an error body, defaulting the code to `unknown_error`.
pub fn parse_api_error(body: &str) -> Result<ApiErrorBody> {
    let mut err: ApiErrorBody = serde_json::from_str(body)
        .map_err(|e| CodestashError::Protocol(format!("decode api error: {}", e)))?;
    if err.code.is_empty() {
        err.code = "unknown_error".to_string();
    }
    Ok(err)
}

async fn decode_api_error(res: Response) -> Result<ApiErrorBody> {
    let body = res.text().await?;
    parse_api_error(&body)
}

async fn ensure_success(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let err = decode_api_error(res).await?;
    Err(CodestashError::Protocol(format!(
        "api error: {} (HTTP {})",
        err.code,
        status.as_u16()
    )))
}

async fn decode_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    let body = res.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| CodestashError::Protocol(format!("decode response: {}", e)))
}

/// Like [`decode_json`], but an empty body decodes to `None`.
async fn decode_optional_json<T: DeserializeOwned>(res: Response) -> Result<Option<T>> {
    let body = res.text().await?;
    parse_optional_body(&body)
}

pub fn parse_optional_body<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| CodestashError::Protocol(format!("decode response: {}", e)))
}
