//! OAuth 2.0 device-authorization grant.
//!
//! [`poll_for_token`] drives the polling half of the flow: wait, try the
//! exchange, react to the server's answer. Waiting is the only suspension
//! point and is raced against a [`CancellationToken`].

pub mod token_store;

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, DeviceCodeResponse, OAuthErrorCode, TokenExchange, TokenResponse};
use crate::error::{CodestashError, Result};

pub use token_store::Credential;

/// Poll interval used when the server does not suggest one.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Added to the poll interval each time the server answers `slow_down`.
pub const SLOW_DOWN_STEP: Duration = Duration::from_secs(1);

/// Anything that can attempt a device-code exchange.
#[allow(async_fn_in_trait)]
pub trait DeviceTokenSource {
    async fn exchange_device_code(&self, device_code: &str) -> Result<TokenExchange>;
}

impl DeviceTokenSource for ApiClient {
    async fn exchange_device_code(&self, device_code: &str) -> Result<TokenExchange> {
        ApiClient::exchange_device_code(self, device_code).await
    }
}

/// Receives progress notifications while polling.
pub trait PollObserver {
    /// The user has not approved the request yet.
    fn pending(&mut self);

    /// The server asked us to back off; `interval` is the new wait.
    fn slowed_down(&mut self, interval: Duration);
}

/// Render a user code for display: `ABC123` becomes `ABC-123`.
///
/// Codes that are not exactly six characters are returned as given.
pub fn format_user_code(code: &str) -> String {
    let code = code.trim();
    if code.chars().count() != 6 {
        return code.to_string();
    }
    let head: String = code.chars().take(3).collect();
    let tail: String = code.chars().skip(3).collect();
    format!("{}-{}", head, tail)
}

/// The first poll interval, honoring the server's suggestion when positive.
pub fn initial_interval(suggested_secs: i64) -> Duration {
    if suggested_secs > 0 {
        Duration::from_secs(suggested_secs as u64)
    } else {
        MIN_POLL_INTERVAL
    }
}

/// Build a credential from a token response issued now.
pub fn credential_from_response(token: TokenResponse) -> Result<Credential> {
    let expires_at = chrono::TimeDelta::try_seconds(token.expires_in)
        .and_then(|lifetime| chrono::Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| CodestashError::Protocol("token lifetime out of range".to_string()))?;
    let scope: BTreeSet<String> = token.scope.split_whitespace().map(String::from).collect();
    Ok(Credential {
        access_token: token.access_token,
        refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        scope,
        expires_at,
    })
}

/// When polling must stop on our side, if the server gave a usable window.
fn client_deadline(expires_in: i64) -> Option<Instant> {
    if expires_in <= 0 {
        return None;
    }
    Instant::now().checked_add(Duration::from_secs(expires_in as u64))
}

/// Poll until the device code is approved, rejected, expires, or `cancel`
/// fires.
pub async fn poll_for_token<S, O>(
    source: &S,
    device: &DeviceCodeResponse,
    observer: &mut O,
    cancel: &CancellationToken,
) -> Result<Credential>
where
    S: DeviceTokenSource,
    O: PollObserver,
{
    let mut interval = initial_interval(device.interval);
    // A missing expiry window leaves the loop bounded only by the server.
    let deadline = client_deadline(device.expires_in);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("device authorization cancelled");
                return Err(CodestashError::Cancelled);
            }
            _ = tokio::time::sleep(interval) => {}
        }

        if deadline.is_some_and(|d| Instant::now() > d) {
            return Err(CodestashError::Timeout);
        }

        match source.exchange_device_code(&device.device_code).await? {
            TokenExchange::Granted(token) => {
                tracing::info!("device authorization granted");
                return credential_from_response(token);
            }
            TokenExchange::Rejected(code) => match code {
                OAuthErrorCode::AuthorizationPending => observer.pending(),
                OAuthErrorCode::SlowDown => {
                    interval += SLOW_DOWN_STEP;
                    tracing::debug!("slow_down received, interval now {:?}", interval);
                    observer.slowed_down(interval);
                }
                OAuthErrorCode::ExpiredToken => return Err(CodestashError::Expired),
                OAuthErrorCode::AccessDenied => return Err(CodestashError::Denied),
                OAuthErrorCode::Other(code) => {
                    return Err(CodestashError::Protocol(format!(
                        "token exchange error: {}",
                        code
                    )))
                }
            },
        }
    }
}

/// Poll for a token and persist it at `token_path`.
pub async fn complete_device_flow<S, O>(
    source: &S,
    device: &DeviceCodeResponse,
    token_path: &Path,
    observer: &mut O,
    cancel: &CancellationToken,
) -> Result<Credential>
where
    S: DeviceTokenSource,
    O: PollObserver,
{
    let credential = poll_for_token(source, device, observer, cancel).await?;
    token_store::save(token_path, &credential)?;
    Ok(credential)
}
