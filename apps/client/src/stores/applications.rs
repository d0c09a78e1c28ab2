use uuid::Uuid;

use super::StoreStatus;
use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{
    Application, ApplicationFilters, ApplicationStats, ApplicationStatus, ApplicationUpdate,
    NewApplication,
};

pub struct ApplicationStore {
    api: ApiClient,
    pub applications: Vec<Application>,
    pub current: Option<Application>,
    pub stats: Option<ApplicationStats>,
    pub filters: ApplicationFilters,
    pub status: StoreStatus,
}

impl ApplicationStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            applications: Vec::new(),
            current: None,
            stats: None,
            filters: ApplicationFilters::default(),
            status: StoreStatus::default(),
        }
    }

    /// Replaces the active filters; takes effect on the next fetch.
    pub fn set_filters(&mut self, filters: ApplicationFilters) {
        self.filters = filters;
    }

    pub async fn fetch_applications(&mut self) {
        self.status.begin();
        let result = self.api.applications().list(&self.filters).await;
        if let Ok(applications) = self.status.settle(result, "Failed to fetch applications") {
            self.applications = applications;
        }
    }

    pub async fn fetch_application(&mut self, id: Uuid) {
        self.status.begin();
        let result = self.api.applications().get(id).await;
        if let Ok(application) = self.status.settle(result, "Failed to fetch application") {
            self.current = Some(application);
        }
    }

    pub async fn fetch_stats(&mut self) {
        self.status.begin();
        let result = self.api.applications().stats().await;
        if let Ok(stats) = self.status.settle(result, "Failed to fetch statistics") {
            self.stats = Some(stats);
        }
    }

    pub async fn create(&mut self, application: &NewApplication) -> Result<Application, ClientError> {
        self.status.begin();
        let result = self.api.applications().create(application).await;
        let created = self.status.settle(result, "Failed to create application")?;
        self.applications.insert(0, created.clone());
        Ok(created)
    }

    pub async fn update(
        &mut self,
        id: Uuid,
        update: &ApplicationUpdate,
    ) -> Result<Application, ClientError> {
        self.status.begin();
        let result = self.api.applications().update(id, update).await;
        let updated = self.status.settle(result, "Failed to update application")?;
        self.replace(&updated);
        Ok(updated)
    }

    pub async fn update_status(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, ClientError> {
        self.status.begin();
        let result = self.api.applications().update_status(id, status).await;
        let updated = self.status.settle(result, "Failed to update status")?;
        self.replace(&updated);
        Ok(updated)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.status.begin();
        let result = self.api.applications().delete(id).await;
        self.status.settle(result, "Failed to delete application")?;
        self.applications.retain(|a| a.id != id);
        if self.current.as_ref().is_some_and(|a| a.id == id) {
            self.current = None;
        }
        Ok(())
    }

    fn replace(&mut self, application: &Application) {
        if let Some(slot) = self.applications.iter_mut().find(|a| a.id == application.id) {
            *slot = application.clone();
        }
        if self.current.as_ref().is_some_and(|a| a.id == application.id) {
            self.current = Some(application.clone());
        }
    }
}
