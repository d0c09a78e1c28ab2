use uuid::Uuid;

use crate::api_client::{ApiClient, RequestOptions};
use crate::errors::ClientError;
use crate::models::{
    Application, ApplicationFilters, ApplicationStats, ApplicationStatus, ApplicationUpdate,
    NewApplication, StatusChange,
};

pub struct Applications<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn applications(&self) -> Applications<'_> {
        Applications { api: self }
    }
}

impl Applications<'_> {
    pub async fn list(&self, filters: &ApplicationFilters) -> Result<Vec<Application>, ClientError> {
        let options = RequestOptions::new().query_params(filters)?;
        self.api
            .get_json_with("/api/v1/applications", &options)
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Application, ClientError> {
        self.api.get_json(&format!("/api/v1/applications/{id}")).await
    }

    pub async fn create(&self, application: &NewApplication) -> Result<Application, ClientError> {
        self.api
            .post_json("/api/v1/applications", application)
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        update: &ApplicationUpdate,
    ) -> Result<Application, ClientError> {
        self.api
            .put_json(&format!("/api/v1/applications/{id}"), update)
            .await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, ClientError> {
        self.api
            .patch_json(
                &format!("/api/v1/applications/{id}/status"),
                &StatusChange { status },
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete(&format!("/api/v1/applications/{id}")).await
    }

    pub async fn stats(&self) -> Result<ApplicationStats, ClientError> {
        self.api.get_json("/api/v1/applications/stats").await
    }
}
