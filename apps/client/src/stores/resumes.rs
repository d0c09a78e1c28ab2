use bytes::Bytes;
use uuid::Uuid;

use super::StoreStatus;
use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{Resume, ResumeUpdate};

pub struct ResumeStore {
    api: ApiClient,
    pub resumes: Vec<Resume>,
    pub current: Option<Resume>,
    pub status: StoreStatus,
}

impl ResumeStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resumes: Vec::new(),
            current: None,
            status: StoreStatus::default(),
        }
    }

    pub fn primary(&self) -> Option<&Resume> {
        self.resumes.iter().find(|r| r.is_primary)
    }

    pub async fn fetch_resumes(&mut self) {
        self.status.begin();
        let result = self.api.resumes().list().await;
        if let Ok(resumes) = self.status.settle(result, "Failed to fetch resumes") {
            self.resumes = resumes;
        }
    }

    pub async fn fetch_resume(&mut self, id: Uuid) {
        self.status.begin();
        let result = self.api.resumes().get(id).await;
        if let Ok(resume) = self.status.settle(result, "Failed to fetch resume") {
            self.current = Some(resume);
        }
    }

    pub async fn upload(
        &mut self,
        file_name: &str,
        bytes: impl Into<Bytes>,
        title: &str,
    ) -> Result<Resume, ClientError> {
        self.status.begin();
        let result = self.api.resumes().upload(file_name, bytes, title).await;
        let resume = self.status.settle(result, "Failed to upload resume")?;
        self.resumes.insert(0, resume.clone());
        Ok(resume)
    }

    pub async fn update(&mut self, id: Uuid, update: &ResumeUpdate) -> Result<Resume, ClientError> {
        self.status.begin();
        let result = self.api.resumes().update(id, update).await;
        let resume = self.status.settle(result, "Failed to update resume")?;
        self.replace(&resume);
        Ok(resume)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.status.begin();
        let result = self.api.resumes().delete(id).await;
        self.status.settle(result, "Failed to delete resume")?;
        self.resumes.retain(|r| r.id != id);
        if self.current.as_ref().is_some_and(|r| r.id == id) {
            self.current = None;
        }
        Ok(())
    }

    /// Only one resume is primary; the others are demoted locally.
    pub async fn set_primary(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.status.begin();
        let result = self.api.resumes().set_primary(id).await;
        self.status.settle(result, "Failed to set primary resume")?;
        for resume in &mut self.resumes {
            resume.is_primary = resume.id == id;
        }
        Ok(())
    }

    pub async fn analyze(&mut self, id: Uuid) -> Result<Resume, ClientError> {
        self.status.begin();
        let result = self.api.resumes().analyze(id).await;
        let resume = self.status.settle(result, "Failed to analyze resume")?;
        self.replace(&resume);
        Ok(resume)
    }

    fn replace(&mut self, resume: &Resume) {
        if let Some(slot) = self.resumes.iter_mut().find(|r| r.id == resume.id) {
            *slot = resume.clone();
        }
        if self.current.as_ref().is_some_and(|r| r.id == resume.id) {
            self.current = Some(resume.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TokenPair;
    use crate::stores::testing::api_for;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const A: &str = "0b6d7c1e-3f9a-4d21-8a55-1e2f3a4b5c6d";
    const B: &str = "7a1c2d3e-4f5a-4b6c-8d7e-9f0a1b2c3d4e";

    fn resume_json(id: &str, primary: bool) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": "5f0c6f4e-8d5e-4b8b-9a51-3c7c2f6e1a10",
            "title": "Backend",
            "is_primary": primary,
            "created_at": "2024-02-01T12:00:00",
            "updated_at": "2024-02-01T12:00:00"
        })
    }

    #[tokio::test]
    async fn test_fetch_failure_is_recorded_not_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/resumes"))
            .respond_with(ResponseTemplate::new(500).set_body_string(""))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut store = ResumeStore::new(api);
        store.fetch_resumes().await;

        assert!(!store.status.is_loading);
        assert_eq!(store.status.error.as_deref(), Some("Internal Server Error"));
        assert!(store.resumes.is_empty());
    }

    #[tokio::test]
    async fn test_set_primary_demotes_others() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/resumes"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([resume_json(A, true), resume_json(B, false)])),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/api/v1/resumes/{B}/set-primary")))
            .respond_with(ResponseTemplate::new(200).set_body_json(resume_json(B, true)))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut store = ResumeStore::new(api);
        store.fetch_resumes().await;
        store.set_primary(B.parse().unwrap()).await.unwrap();

        assert_eq!(store.primary().map(|r| r.id.to_string()), Some(B.to_string()));
        assert_eq!(store.resumes.iter().filter(|r| r.is_primary).count(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_is_returned_and_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v1/resumes/{A}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Resume not found"})))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut store = ResumeStore::new(api);
        let err = store.delete(A.parse().unwrap()).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(store.status.error.as_deref(), Some("Resume not found"));
    }
}
