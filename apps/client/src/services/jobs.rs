use reqwest::Method;
use uuid::Uuid;

use crate::api_client::{ApiClient, RequestOptions};
use crate::errors::ClientError;
use crate::models::{Job, JobSearchParams, MatchedJob};

/// Job endpoints of the primary backend (matching and bookmarks need the
/// user's session). Plain listing search also lives on `jobs_backend`.
pub struct Jobs<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn jobs(&self) -> Jobs<'_> {
        Jobs { api: self }
    }
}

impl Jobs<'_> {
    pub async fn search(&self, params: &JobSearchParams) -> Result<Vec<Job>, ClientError> {
        let options = RequestOptions::new().query_params(params)?;
        self.api
            .get_json_with("/api/v1/jobs/search", &options)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Job, ClientError> {
        self.api.get_json(&format!("/api/v1/jobs/{id}")).await
    }

    /// Jobs ranked against a resume (the primary one when `None`).
    pub async fn matches(&self, resume_id: Option<Uuid>) -> Result<Vec<MatchedJob>, ClientError> {
        let mut options = RequestOptions::new();
        if let Some(resume_id) = resume_id {
            options = options.query("resume_id", resume_id.to_string());
        }
        self.api
            .get_json_with("/api/v1/jobs/matches", &options)
            .await
    }

    pub async fn bookmark(&self, id: &str) -> Result<(), ClientError> {
        self.api
            .send_unit(Method::POST, &format!("/api/v1/jobs/{id}/bookmark"))
            .await
    }

    pub async fn unbookmark(&self, id: &str) -> Result<(), ClientError> {
        self.api
            .delete(&format!("/api/v1/jobs/{id}/bookmark"))
            .await
    }

    pub async fn bookmarked(&self) -> Result<Vec<Job>, ClientError> {
        self.api.get_json("/api/v1/jobs/bookmarked").await
    }
}
