use bytes::Bytes;
use serde_json::Value;

use crate::api_client::{ApiClient, MultipartForm};
use crate::errors::ClientError;
use crate::models::{PictureUpload, User, UserProfileUpdate};

pub struct Users<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn users(&self) -> Users<'_> {
        Users { api: self }
    }
}

impl Users<'_> {
    /// PUT /api/v1/users/me
    pub async fn update_profile(&self, update: &UserProfileUpdate) -> Result<User, ClientError> {
        self.api.put_json("/api/v1/users/me", update).await
    }

    /// POST /api/v1/users/me/picture
    pub async fn upload_profile_picture(
        &self,
        file_name: &str,
        mime: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Result<PictureUpload, ClientError> {
        let form = MultipartForm::new().file("file", file_name, mime, bytes);
        self.api
            .post_multipart("/api/v1/users/me/picture", form)
            .await
    }

    /// Preferences are an open JSON document owned by the backend.
    pub async fn preferences(&self) -> Result<Value, ClientError> {
        self.api.get_json("/api/v1/users/me/preferences").await
    }

    pub async fn update_preferences(&self, preferences: &Value) -> Result<Value, ClientError> {
        self.api
            .put_json("/api/v1/users/me/preferences", preferences)
            .await
    }
}
