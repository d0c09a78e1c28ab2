use tracing::debug;

use super::StoreStatus;
use crate::api_client::ApiClient;
use crate::errors::{ClientError, ExpiryReason};
use crate::models::{LoginRequest, RegisterRequest, User};

/// Signed-in user and authentication flag.
pub struct AuthStore {
    api: ApiClient,
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub status: StoreStatus,
}

impl AuthStore {
    pub fn new(api: ApiClient) -> Self {
        let is_authenticated = api.session().is_authenticated();
        Self {
            api,
            user: None,
            is_authenticated,
            status: StoreStatus::default(),
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        self.status.begin();
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self.api.auth().login(&request).await;
        self.status.settle(result, "Login failed")?;
        self.is_authenticated = true;
        self.fetch_user().await;
        Ok(())
    }

    /// Creates the account, then signs straight in with it.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), ClientError> {
        self.status.begin();
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
        };
        let result = self.api.auth().register(&request).await;
        self.status.settle(result, "Registration failed")?;
        self.login(email, password).await
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result = self.api.auth().logout().await;
        self.user = None;
        self.is_authenticated = false;
        self.status.settle(result, "Logout failed")
    }

    /// Loads the current user. Without stored credentials this is a no-op
    /// that leaves the store signed out.
    pub async fn fetch_user(&mut self) {
        if !self.api.session().is_authenticated() {
            debug!("No stored credentials; skipping user fetch");
            self.user = None;
            self.is_authenticated = false;
            return;
        }

        self.status.begin();
        let result = self.api.auth().current_user().await;
        // Only a 4xx refusal revokes the stored credentials. Server errors and
        // transport failures leave them in place; a `SessionExpired` was
        // already cleared by the client.
        if let Err(ClientError::Api {
            status: 400..=499, ..
        }) = &result
        {
            self.api.session().expire(ExpiryReason::Revoked).await;
        }
        let is_authenticated = self.api.session().is_authenticated();
        match self.status.settle(result, "Failed to fetch user") {
            Ok(user) => {
                self.user = Some(user);
                self.is_authenticated = true;
            }
            Err(_) => {
                self.user = None;
                self.is_authenticated = is_authenticated;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TokenPair;
    use crate::stores::testing::api_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json() -> serde_json::Value {
        json!({
            "id": "5f0c6f4e-8d5e-4b8b-9a51-3c7c2f6e1a10",
            "email": "ada@example.com",
            "full_name": "Ada Lovelace",
            "email_verified": true,
            "is_active": true,
            "subscription_tier": "free",
            "created_at": "2024-01-05T09:30:00"
        })
    }

    #[tokio::test]
    async fn test_login_persists_pair_and_loads_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_json(json!({"email": "ada@example.com", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "a-1",
                "refresh_token": "r-1",
                "token_type": "bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .and(header("authorization", "Bearer a-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .mount(&server)
            .await;

        let (api, store) = api_for(&server, None).await;
        let mut auth = AuthStore::new(api);
        auth.login("ada@example.com", "hunter22").await.unwrap();

        assert!(auth.is_authenticated);
        assert_eq!(auth.user.as_ref().map(|u| u.full_name.as_str()), Some("Ada Lovelace"));
        assert_eq!(store.snapshot().await, Some(TokenPair::new("a-1", "r-1")));
    }

    #[tokio::test]
    async fn test_bad_password_does_not_touch_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Incorrect email or password"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let (api, store) = api_for(&server, Some(TokenPair::new("old-a", "old-r"))).await;
        let mut auth = AuthStore::new(api);
        let err = auth.login("ada@example.com", "wrong").await.unwrap_err();

        assert!(!err.is_session_expired());
        assert_eq!(auth.status.error.as_deref(), Some("Incorrect email or password"));
        assert_eq!(store.snapshot().await, Some(TokenPair::new("old-a", "old-r")));
    }

    #[tokio::test]
    async fn test_fetch_user_without_credentials_sends_nothing() {
        let server = MockServer::start().await;
        let (api, _store) = api_for(&server, None).await;
        let mut auth = AuthStore::new(api);

        auth.fetch_user().await;

        assert!(!auth.is_authenticated);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_user_refused_clears_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Inactive user"})))
            .mount(&server)
            .await;

        let (api, store) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut auth = AuthStore::new(api);
        assert!(auth.is_authenticated);

        auth.fetch_user().await;

        assert!(!auth.is_authenticated);
        assert_eq!(auth.status.error.as_deref(), Some("Inactive user"));
        assert_eq!(store.snapshot().await, None);
    }

    #[tokio::test]
    async fn test_fetch_user_server_error_keeps_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"detail": "Service unavailable"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (api, store) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut auth = AuthStore::new(api);

        auth.fetch_user().await;

        assert!(auth.is_authenticated);
        assert!(auth.user.is_none());
        assert_eq!(auth.status.error.as_deref(), Some("Service unavailable"));
        assert_eq!(store.snapshot().await, Some(TokenPair::new("a", "r")));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (api, store) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut auth = AuthStore::new(api);
        auth.logout().await.unwrap();

        assert!(!auth.is_authenticated);
        assert_eq!(store.snapshot().await, None);
    }
}
