use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Draft,
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status '{s}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Option<Uuid>,
    pub company_name: String,
    pub job_title: String,
    pub job_url: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub applied_date: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub match_score: Option<f64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub company_name: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
}

impl NewApplication {
    pub fn new(company_name: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            job_title: job_title.into(),
            job_url: None,
            status: None,
            applied_date: None,
            source: None,
            notes: None,
            job_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplicationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// List filters; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplicationFilters {
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusChange<S> {
    pub status: S,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: u64,
    #[serde(default)]
    pub by_status: HashMap<String, u64>,
    #[serde(default)]
    pub response_rate: f64,
    #[serde(default)]
    pub interview_rate: f64,
}
