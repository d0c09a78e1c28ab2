use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{AnalyticsOverview, CompanyCount, Insight};

pub struct Analytics<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn analytics(&self) -> Analytics<'_> {
        Analytics { api: self }
    }
}

impl Analytics<'_> {
    pub async fn overview(&self) -> Result<AnalyticsOverview, ClientError> {
        self.api.get_json("/api/v1/analytics/overview").await
    }

    pub async fn insights(&self) -> Result<Vec<Insight>, ClientError> {
        self.api.get_json("/api/v1/analytics/insights").await
    }

    pub async fn top_companies(&self) -> Result<Vec<CompanyCount>, ClientError> {
        self.api.get_json("/api/v1/analytics/top-companies").await
    }
}
