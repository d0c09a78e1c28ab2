use tracing::{info, warn};

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{LoginRequest, MessageResponse, PasswordChange, RegisterRequest, User};
use crate::session::TokenResponse;

pub struct Auth<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth { api: self }
    }
}

impl Auth<'_> {
    /// POST /api/v1/auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        self.api
            .post_json_anonymous("/api/v1/auth/register", request)
            .await
    }

    /// POST /api/v1/auth/login. Persists the issued pair on success.
    pub async fn login(&self, request: &LoginRequest) -> Result<(), ClientError> {
        let tokens: TokenResponse = self
            .api
            .post_json_anonymous("/api/v1/auth/login", request)
            .await?;
        self.api.session().establish(tokens.into()).await?;
        info!("Signed in as {}", request.email);
        Ok(())
    }

    /// POST /api/v1/auth/logout, best effort. Local credentials are
    /// cleared whatever the server says.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.api.session().is_authenticated() {
            let result: Result<MessageResponse, _> =
                self.api.post_empty("/api/v1/auth/logout").await;
            if let Err(e) = result {
                warn!("Server-side logout failed: {e}");
            }
        }
        self.api.session().sign_out().await?;
        Ok(())
    }

    /// GET /api/v1/auth/me
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.api.get_json("/api/v1/auth/me").await
    }

    /// POST /api/v1/auth/change-password
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ClientError> {
        self.api
            .post_json(
                "/api/v1/auth/change-password",
                &PasswordChange {
                    old_password,
                    new_password,
                },
            )
            .await
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }
}
