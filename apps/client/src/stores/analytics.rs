use super::StoreStatus;
use crate::api_client::ApiClient;
use crate::models::{AnalyticsOverview, CompanyCount, Insight};

pub struct AnalyticsStore {
    api: ApiClient,
    pub overview: Option<AnalyticsOverview>,
    pub insights: Vec<Insight>,
    pub top_companies: Vec<CompanyCount>,
    pub status: StoreStatus,
}

impl AnalyticsStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            overview: None,
            insights: Vec::new(),
            top_companies: Vec::new(),
            status: StoreStatus::default(),
        }
    }

    pub async fn fetch_overview(&mut self) {
        self.status.begin();
        let result = self.api.analytics().overview().await;
        if let Ok(overview) = self.status.settle(result, "Failed to fetch analytics") {
            self.overview = Some(overview);
        }
    }

    pub async fn fetch_insights(&mut self) {
        self.status.begin();
        let result = self.api.analytics().insights().await;
        if let Ok(insights) = self.status.settle(result, "Failed to fetch insights") {
            self.insights = insights;
        }
    }

    pub async fn fetch_top_companies(&mut self) {
        self.status.begin();
        let result = self.api.analytics().top_companies().await;
        if let Ok(companies) = self.status.settle(result, "Failed to fetch top companies") {
            self.top_companies = companies;
        }
    }

    /// Dashboard load: each part is fetched in turn; the last failure wins.
    pub async fn fetch_all(&mut self) {
        self.fetch_overview().await;
        let overview_error = self.status.error.clone();
        self.fetch_insights().await;
        let insights_error = self.status.error.clone();
        self.fetch_top_companies().await;
        if self.status.error.is_none() {
            self.status.error = insights_error.or(overview_error);
        }
    }
}
