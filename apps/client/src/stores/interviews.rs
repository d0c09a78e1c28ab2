use uuid::Uuid;

use super::StoreStatus;
use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{Interview, InterviewStatus, InterviewUpdate, NewInterview};

pub struct InterviewStore {
    api: ApiClient,
    pub interviews: Vec<Interview>,
    pub upcoming: Vec<Interview>,
    pub current: Option<Interview>,
    pub status: StoreStatus,
}

impl InterviewStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            interviews: Vec::new(),
            upcoming: Vec::new(),
            current: None,
            status: StoreStatus::default(),
        }
    }

    pub async fn fetch_interviews(&mut self) {
        self.status.begin();
        let result = self.api.interviews().list().await;
        if let Ok(interviews) = self.status.settle(result, "Failed to fetch interviews") {
            self.interviews = interviews;
        }
    }

    pub async fn fetch_upcoming(&mut self) {
        self.status.begin();
        let result = self.api.interviews().upcoming().await;
        if let Ok(upcoming) = self.status.settle(result, "Failed to fetch upcoming interviews") {
            self.upcoming = upcoming;
        }
    }

    pub async fn fetch_interview(&mut self, id: Uuid) {
        self.status.begin();
        let result = self.api.interviews().get(id).await;
        if let Ok(interview) = self.status.settle(result, "Failed to fetch interview") {
            self.current = Some(interview);
        }
    }

    pub async fn create(&mut self, interview: &NewInterview) -> Result<Interview, ClientError> {
        self.status.begin();
        let result = self.api.interviews().create(interview).await;
        let created = self.status.settle(result, "Failed to create interview")?;
        self.interviews.push(created.clone());
        self.interviews.sort_by_key(|i| i.scheduled_at);
        Ok(created)
    }

    pub async fn update(&mut self, id: Uuid, update: &InterviewUpdate) -> Result<Interview, ClientError> {
        self.status.begin();
        let result = self.api.interviews().update(id, update).await;
        let updated = self.status.settle(result, "Failed to update interview")?;
        self.replace(&updated);
        Ok(updated)
    }

    pub async fn update_status(
        &mut self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Interview, ClientError> {
        self.status.begin();
        let result = self.api.interviews().update_status(id, status).await;
        let updated = self.status.settle(result, "Failed to update interview status")?;
        self.replace(&updated);
        Ok(updated)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.status.begin();
        let result = self.api.interviews().delete(id).await;
        self.status.settle(result, "Failed to delete interview")?;
        self.interviews.retain(|i| i.id != id);
        self.upcoming.retain(|i| i.id != id);
        if self.current.as_ref().is_some_and(|i| i.id == id) {
            self.current = None;
        }
        Ok(())
    }

    fn replace(&mut self, interview: &Interview) {
        for list in [&mut self.interviews, &mut self.upcoming] {
            if let Some(slot) = list.iter_mut().find(|i| i.id == interview.id) {
                *slot = interview.clone();
            }
        }
        if self.current.as_ref().is_some_and(|i| i.id == interview.id) {
            self.current = Some(interview.clone());
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

    const ID: &str = "9e8d7c6b-5a4f-4e3d-8c2b-1a0f9e8d7c6b";

    #[tokio::test]
    async fn test_delete_drops_from_both_lists() {
        let server = MockServer::start().await;
        let interview = json!({
            "id": ID,
            "application_id": "3c1d2e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
            "user_id": "5f0c6f4e-8d5e-4b8b-9a51-3c7c2f6e1a10",
            "interview_type": "video",
            "status": "scheduled",
            "scheduled_at": "2024-05-01T15:00:00Z",
            "created_at": "2024-04-20T10:00:00",
            "updated_at": "2024-04-20T10:00:00"
        });
        Mock::given(method("GET"))
            .and(path("/api/v1/interviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([interview.clone()])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/interviews/upcoming"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([interview])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v1/interviews/{ID}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut store = InterviewStore::new(api);
        store.fetch_interviews().await;
        store.fetch_upcoming().await;
        assert_eq!(store.upcoming.len(), 1);

        store.delete(ID.parse().unwrap()).await.unwrap();
        assert!(store.interviews.is_empty());
        assert!(store.upcoming.is_empty());
    }
}
