use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    pub raw_text: Option<String>,
    pub ats_score: Option<f64>,
    pub keyword_match_score: Option<f64>,
    #[serde(default)]
    pub strengths: Option<Vec<String>>,
    #[serde(default)]
    pub weaknesses: Option<Vec<String>>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub missing_keywords: Option<Vec<String>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Resume {
    /// Whether the analyzer has scored this resume yet.
    pub fn is_analyzed(&self) -> bool {
        self.ats_score.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}
