use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub total_applications: u64,
    pub response_rate: f64,
    pub interview_rate: f64,
    #[serde(default)]
    pub avg_response_time_days: f64,
    #[serde(default)]
    pub applications_by_status: HashMap<String, u64>,
    #[serde(default)]
    pub applications_by_month: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Strength,
    Tip,
    Opportunity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyCount {
    pub company: String,
    pub application_count: u64,
}
