use uuid::Uuid;

use super::StoreStatus;
use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{Job, JobSearchParams, MatchedJob};

pub struct JobStore {
    api: ApiClient,
    pub jobs: Vec<Job>,
    pub current: Option<Job>,
    pub matches: Vec<MatchedJob>,
    pub bookmarked: Vec<Job>,
    pub params: JobSearchParams,
    pub status: StoreStatus,
}

impl JobStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            jobs: Vec::new(),
            current: None,
            matches: Vec::new(),
            bookmarked: Vec::new(),
            params: JobSearchParams::default(),
            status: StoreStatus::default(),
        }
    }

    pub fn set_params(&mut self, params: JobSearchParams) {
        self.params = params;
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarked.iter().any(|j| j.id == id)
    }

    pub async fn search(&mut self) {
        self.status.begin();
        let result = self.api.jobs().search(&self.params).await;
        if let Ok(jobs) = self.status.settle(result, "Failed to search jobs") {
            self.jobs = jobs;
        }
    }

    pub async fn fetch_job(&mut self, id: &str) {
        self.status.begin();
        let result = self.api.jobs().get(id).await;
        if let Ok(job) = self.status.settle(result, "Failed to fetch job") {
            self.current = Some(job);
        }
    }

    pub async fn fetch_matches(&mut self, resume_id: Option<Uuid>) {
        self.status.begin();
        let result = self.api.jobs().matches(resume_id).await;
        if let Ok(matches) = self.status.settle(result, "Failed to fetch job matches") {
            self.matches = matches;
        }
    }

    pub async fn fetch_bookmarked(&mut self) {
        self.status.begin();
        let result = self.api.jobs().bookmarked().await;
        if let Ok(jobs) = self.status.settle(result, "Failed to fetch bookmarked jobs") {
            self.bookmarked = jobs;
        }
    }

    pub async fn bookmark(&mut self, id: &str) -> Result<(), ClientError> {
        self.status.begin();
        let result = self.api.jobs().bookmark(id).await;
        self.status.settle(result, "Failed to bookmark job")?;
        if !self.is_bookmarked(id) {
            let known = self
                .jobs
                .iter()
                .chain(self.current.iter())
                .find(|j| j.id == id)
                .cloned();
            if let Some(job) = known {
                self.bookmarked.push(job);
            }
        }
        Ok(())
    }

    pub async fn unbookmark(&mut self, id: &str) -> Result<(), ClientError> {
        self.status.begin();
        let result = self.api.jobs().unbookmark(id).await;
        self.status.settle(result, "Failed to remove bookmark")?;
        self.bookmarked.retain(|j| j.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TokenPair;
    use crate::stores::testing::api_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Rust Engineer",
            "company": "Ferrous",
            "salary_min": 90000.0,
            "created_at": "2024-03-01T10:00:00"
        })
    }

    #[tokio::test]
    async fn test_search_then_bookmark() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/jobs/search"))
            .and(query_param("query", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([job_json("j-1"), job_json("j-2")])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/jobs/j-2/bookmark"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Job bookmarked"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/jobs/j-2/bookmark"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut store = JobStore::new(api);
        store.set_params(JobSearchParams {
            query: Some("rust".into()),
            ..Default::default()
        });
        store.search().await;
        assert_eq!(store.jobs.len(), 2);

        store.bookmark("j-2").await.unwrap();
        assert!(store.is_bookmarked("j-2"));

        store.unbookmark("j-2").await.unwrap();
        assert!(!store.is_bookmarked("j-2"));
    }

    #[tokio::test]
    async fn test_matches_pass_resume_id() {
        let server = MockServer::start().await;
        let resume_id = "0b6d7c1e-3f9a-4d21-8a55-1e2f3a4b5c6d";
        let mut matched = job_json("j-9");
        matched["match_score"] = json!(87.5);
        Mock::given(method("GET"))
            .and(path("/api/v1/jobs/matches"))
            .and(query_param("resume_id", resume_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([matched])))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, Some(TokenPair::new("a", "r"))).await;
        let mut store = JobStore::new(api);
        store.fetch_matches(Some(resume_id.parse().unwrap())).await;

        assert_eq!(store.status.error, None);
        assert_eq!(store.matches[0].job.id, "j-9");
        assert_eq!(store.matches[0].match_score, 87.5);
    }
}
