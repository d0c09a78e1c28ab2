//! Authenticated API client: the single point of entry for every call to the
//! primary backend.
//!
//! Attaches the session's bearer token, recovers once from an expired token
//! through the `SessionManager`, and passes every other failure through
//! untouched. The job-listings backend is not reached through here; see
//! `jobs_backend`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{error_detail, ClientError, ExpiryReason, RefreshError};
use crate::session::SessionManager;

pub mod request;

pub use request::{MultipartForm, RequestBody, RequestOptions};

/// A request is reissued at most this many times after a credential refresh.
const MAX_AUTH_RETRIES: u32 = 1;
const USER_AGENT: &str = concat!("jobdeck/", env!("CARGO_PKG_VERSION"));

/// One send of a request: the token it carries and how many refreshes
/// preceded it. Replaced, never mutated, between attempts.
#[derive(Debug)]
struct Attempt {
    token: Option<String>,
    retries: u32,
}

impl Attempt {
    fn first(token: Option<String>) -> Self {
        Self { token, retries: 0 }
    }

    fn after_refresh(self, token: String) -> Self {
        Self {
            token: Some(token),
            retries: self.retries + 1,
        }
    }

    fn may_refresh(&self) -> bool {
        self.retries < MAX_AUTH_RETRIES
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionManager>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn from_config(config: &Config, session: Arc<SessionManager>) -> Result<Self, ClientError> {
        Self::new(config.api_url.clone(), config.request_timeout, session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Issues `method path` and returns the successful response.
    ///
    /// A 401 triggers one shared credential refresh and a single reissue with
    /// the new token. A 401 on the reissue, or a failed refresh, expires the
    /// session. A refresh cancelled by its leader fails the request with
    /// `RefreshInterrupted` and keeps the session. Anything else (transport
    /// errors, timeouts, other statuses) is returned as-is without touching
    /// credentials.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&RequestBody>,
        options: &RequestOptions,
    ) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = Attempt::first(self.session.access_token());

        loop {
            let response = self
                .send(method.clone(), &url, body, options, attempt.token.as_deref())
                .await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return check_status(response).await;
            }

            if !attempt.may_refresh() {
                warn!(%method, path, "Request rejected again after credential refresh");
                let reason = ExpiryReason::RejectedAfterRefresh;
                self.session.expire(reason.clone()).await;
                return Err(ClientError::SessionExpired(reason));
            }

            debug!(%method, path, "Access token rejected; recovering session");
            let token = self
                .session
                .recover(attempt.token.as_deref())
                .await
                .map_err(|e| match e {
                    RefreshError::Abandoned => ClientError::RefreshInterrupted,
                    e => ClientError::SessionExpired(ExpiryReason::Refresh(e)),
                })?;
            attempt = attempt.after_refresh(token);
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&RequestBody>,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut builder = self
            .client
            .request(method, url)
            .headers(options.headers.clone());

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Multipart(form)) => builder.multipart(form.build()?),
            None => builder,
        };

        Ok(builder.send().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.get_json_with(path, &RequestOptions::default()).await
    }

    pub async fn get_json_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path, None, options).await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, path, body).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        let response = self
            .request(method, path, Some(&body), &RequestOptions::default())
            .await?;
        decode(response).await
    }

    /// POST that never carries a token and never recovers the session.
    /// Used for sign-in, where a 401 means bad credentials, not an expired token.
    pub async fn post_json_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let body = RequestBody::Json(serde_json::to_value(body)?);
        let response = self
            .send(Method::POST, &url, Some(&body), &RequestOptions::default(), None)
            .await?;
        decode(check_status(response).await?).await
    }

    /// POST without a body, decoding the response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .request(Method::POST, path, None, &RequestOptions::default())
            .await?;
        decode(response).await
    }

    /// Sends a body-less request and discards whatever comes back.
    pub async fn send_unit(&self, method: Method, path: &str) -> Result<(), ClientError> {
        self.request(method, path, None, &RequestOptions::default())
            .await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send_unit(Method::DELETE, path).await
    }

    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, ClientError> {
        let response = self
            .request(Method::GET, path, None, &RequestOptions::default())
            .await?;
        Ok(response.bytes().await?)
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T, ClientError> {
        let body = RequestBody::Multipart(form);
        let response = self
            .request(Method::POST, path, Some(&body), &RequestOptions::default())
            .await?;
        decode(response).await
    }
}

/// Turns any non-2xx response into `ClientError::Api` carrying the server's
/// `detail` verbatim.
pub(crate) async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: error_detail(status, &body),
    })
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
