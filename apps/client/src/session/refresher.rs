use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{error_detail, ClientError, RefreshError};
use crate::session::store::TokenPair;

pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Exchanges a refresh token for a fresh credential pair.
///
/// The `SessionManager` guarantees at most one call is outstanding.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError>;
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Body returned by the auth backend for login and refresh.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl From<TokenResponse> for TokenPair {
    fn from(r: TokenResponse) -> Self {
        TokenPair::new(r.access_token, r.refresh_token)
    }
}

/// Calls the refresh endpoint directly, bypassing the authenticated client so
/// a rejected refresh can never recurse into another refresh.
#[derive(Clone)]
pub struct HttpTokenRefresher {
    client: Client,
    url: String,
}

impl HttpTokenRefresher {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{REFRESH_PATH}", api_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        debug!("Exchanging refresh token at {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                detail: error_detail(status, &body),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let tokens: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;
        Ok(tokens.into())
    }
}

fn transport_error(e: reqwest::Error) -> RefreshError {
    if e.is_timeout() {
        RefreshError::TimedOut
    } else {
        RefreshError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_refresh_success_returns_new_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .and(body_json(json!({ "refresh_token": "old-r" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new-a",
                "refresh_token": "new-r",
                "token_type": "bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refresher = HttpTokenRefresher::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let pair = refresher.refresh("old-r").await.unwrap();
        assert_eq!(pair, TokenPair::new("new-a", "new-r"));
    }

    #[tokio::test]
    async fn test_refresh_rejection_keeps_server_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid refresh token" })),
            )
            .mount(&server)
            .await;

        let refresher = HttpTokenRefresher::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = refresher.refresh("stale").await.unwrap_err();
        assert_eq!(
            err,
            RefreshError::Rejected {
                status: 401,
                detail: "Invalid refresh token".into()
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_timeout_is_reported_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({ "access_token": "a", "refresh_token": "r" })),
            )
            .mount(&server)
            .await;

        let refresher =
            HttpTokenRefresher::new(&server.uri(), Duration::from_millis(50)).unwrap();
        assert_eq!(
            refresher.refresh("r").await.unwrap_err(),
            RefreshError::TimedOut
        );
    }

    #[tokio::test]
    async fn test_refresh_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "x" })))
            .mount(&server)
            .await;

        let refresher = HttpTokenRefresher::new(&server.uri(), Duration::from_secs(5)).unwrap();
        assert!(matches!(
            refresher.refresh("r").await,
            Err(RefreshError::Malformed(_))
        ));
    }
}
