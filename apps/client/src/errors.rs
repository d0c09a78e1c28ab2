use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why a refresh exchange did not produce a new credential pair.
/// Cloned into every caller queued behind the failed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh rejected (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Refresh request timed out")]
    TimedOut,

    #[error("Refresh request failed: {0}")]
    Transport(String),

    #[error("Refresh response was malformed: {0}")]
    Malformed(String),

    #[error("Refresh was abandoned before it completed")]
    Abandoned,
}

/// Terminal session loss. The caller must sign in again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpiryReason {
    #[error("credential refresh failed: {0}")]
    Refresh(RefreshError),

    #[error("request was rejected again after a credential refresh")]
    RejectedAfterRefresh,

    #[error("the server no longer accepts the stored credentials")]
    Revoked,
}

/// Failures of the credential store backing a session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Error type for every call made through the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Session expired: {0}")]
    SessionExpired(ExpiryReason),

    /// The shared refresh this request waited on was cancelled before it
    /// finished. Credentials are untouched; the call may be retried.
    #[error("Credential refresh was interrupted; try again")]
    RefreshInterrupted,

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Credential storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_timeout())
    }

    /// The server-provided message for API failures, or `fallback` otherwise.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: Option<Value>,
}

/// Extracts the user-facing message from an error body.
///
/// The primary backend answers `{"detail": "..."}`; validation failures carry
/// a list of `{ "msg": ... }` objects instead, which are joined. Anything else
/// falls back to the raw body, then to the canonical status reason.
pub(crate) fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|detail| match detail {
            Value::String(s) => Some(s),
            Value::Array(items) => {
                let msgs: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            Value::Null => None,
            other => Some(other.to_string()),
        });

    if let Some(detail) = detail {
        return detail;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
