use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Phone,
    Video,
    InPerson,
    Panel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl InterviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
            InterviewStatus::NoShow => "no_show",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            "no_show" => Ok(InterviewStatus::NoShow),
            other => Err(format!("unknown interview status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: Uuid,
    pub application_id: Uuid,
    pub user_id: Uuid,
    pub interview_type: InterviewType,
    pub status: InterviewStatus,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub scheduled_at: DateTime<Utc>,
    /// Free-form, e.g. "30" or "45-60".
    pub duration_minutes: Option<String>,
    pub interviewer_name: Option<String>,
    pub interviewer_email: Option<String>,
    pub location_or_url: Option<String>,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInterview {
    pub application_id: Uuid,
    pub interview_type: InterviewType,
    pub scheduled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InterviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interviewer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_or_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InterviewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<InterviewType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InterviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interviewer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_or_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}
