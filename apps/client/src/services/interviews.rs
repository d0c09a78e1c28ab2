use uuid::Uuid;

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{Interview, InterviewStatus, InterviewUpdate, NewInterview, StatusChange};

pub struct Interviews<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn interviews(&self) -> Interviews<'_> {
        Interviews { api: self }
    }
}

impl Interviews<'_> {
    pub async fn list(&self) -> Result<Vec<Interview>, ClientError> {
        self.api.get_json("/api/v1/interviews").await
    }

    pub async fn get(&self, id: Uuid) -> Result<Interview, ClientError> {
        self.api.get_json(&format!("/api/v1/interviews/{id}")).await
    }

    pub async fn upcoming(&self) -> Result<Vec<Interview>, ClientError> {
        self.api.get_json("/api/v1/interviews/upcoming").await
    }

    pub async fn create(&self, interview: &NewInterview) -> Result<Interview, ClientError> {
        self.api.post_json("/api/v1/interviews", interview).await
    }

    pub async fn update(&self, id: Uuid, update: &InterviewUpdate) -> Result<Interview, ClientError> {
        self.api
            .put_json(&format!("/api/v1/interviews/{id}"), update)
            .await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Interview, ClientError> {
        self.api
            .patch_json(
                &format!("/api/v1/interviews/{id}/status"),
                &StatusChange { status },
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete(&format!("/api/v1/interviews/{id}")).await
    }
}
