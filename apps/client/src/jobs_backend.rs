//! Client for the job-listings backend.
//!
//! This collaborator is reached directly with plain `reqwest`, never through
//! `ApiClient`: requests carry no session credential (except the explicit
//! token handed to `trigger_scrape`) and a 401 here never refreshes or clears
//! the user's session.
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::api_client::{check_status, decode, RequestOptions};
use crate::config::Config;
use crate::errors::ClientError;
use crate::models::{Job, JobSearchParams, JobSearchResponse, ScrapeTriggered, ScraperStatus};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct JobsApiClient {
    client: Client,
    base_url: String,
}

impl JobsApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("jobs base_url is required".into()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.jobs_api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /api/v1/jobs/search
    pub async fn search(&self, params: &JobSearchParams) -> Result<JobSearchResponse, ClientError> {
        let options = RequestOptions::new().query_params(params)?;
        debug!(pairs = options.query.len(), "Searching job listings");
        let response = self
            .client
            .get(format!("{}/api/v1/jobs/search", self.base_url))
            .query(&options.query)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    pub async fn get(&self, id: &str) -> Result<Job, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/v1/jobs/{}", self.base_url, id))
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    pub async fn scraper_status(&self) -> Result<ScraperStatus, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/v1/scraper/status", self.base_url))
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    /// Starts a scrape run. The caller's access token is passed explicitly;
    /// a rejection is reported as-is and leaves the session untouched.
    pub async fn trigger_scrape(&self, access_token: &str) -> Result<ScrapeTriggered, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/v1/jobs/scrape", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    /// `true` when `GET /health` answers 2xx; any failure is `false`.
    pub async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Jobs backend health check failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Platform Engineer",
            "company": "Acme",
            "location": "Berlin",
            "description": "Run the fleet",
            "is_active": true,
            "created_at": "2024-03-01T10:00:00Z"
        })
    }

    async fn client(server: &MockServer) -> JobsApiClient {
        JobsApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_only_set_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/jobs/search"))
            .and(query_param("query", "rust"))
            .and(query_param("remote", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobs": [job_json("j-1")],
                "count": 1,
                "page": 1,
                "limit": 20
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = JobSearchParams {
            query: Some("rust".into()),
            remote: Some(true),
            ..Default::default()
        };
        let result = client(&server).await.search(&params).await.unwrap();

        assert_eq!(result.count, 1);
        assert_eq!(result.jobs[0].id, "j-1");

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(!query.contains("location"));
        assert!(!query.contains("limit"));
    }

    #[tokio::test]
    async fn test_get_reports_not_found_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/jobs/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Job not found"})))
            .mount(&server)
            .await;

        let err = client(&server).await.get("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.detail_or("Failed"), "Job not found");
    }

    #[tokio::test]
    async fn test_plain_calls_carry_no_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/scraper/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "is_running": false,
                "last_run": "2024-03-01T10:00:00",
                "jobs_scraped": 42
            })))
            .mount(&server)
            .await;

        let status = client(&server).await.scraper_status().await.unwrap();
        assert!(!status.is_running);
        assert_eq!(status.jobs_scraped, 42);

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_trigger_scrape_uses_explicit_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/jobs/scrape"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "message": "Scraping started",
                "status": "running"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let triggered = client(&server).await.trigger_scrape("access-1").await.unwrap();
        assert_eq!(triggered.status, "running");
    }

    #[tokio::test]
    async fn test_trigger_scrape_rejection_is_plain_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/jobs/scrape"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Unauthorized"})))
            .mount(&server)
            .await;

        let err = client(&server).await.trigger_scrape("stale").await.unwrap_err();
        assert!(!err.is_session_expired());
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        assert!(client(&server).await.health_check().await);

        let down = JobsApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(!down.health_check().await);
    }
}
