use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A job listing. Served by both backends; ids are opaque strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub remote_type: Option<String>,
    #[serde(default)]
    pub description: String,
    pub requirements: Option<String>,
    pub raw_description: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub source_url: Option<String>,
    pub validated_source_url: Option<String>,
    pub source_site: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub posted_date: Option<DateTime<Utc>>,
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub ai_highlights: Vec<String>,
    #[serde(default)]
    pub ai_required_skills: Vec<String>,
    pub ai_compensation: Option<String>,
    pub ai_remote_policy: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub ai_last_enriched_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// "$120k – $150k" style range, when the listing carries one.
    pub fn salary_range(&self) -> Option<String> {
        let k = |v: f64| format!("${}k", (v / 1000.0).round());
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some(format!("{} – {}", k(min), k(max))),
            (Some(min), None) => Some(format!("from {}", k(min))),
            (None, Some(max)) => Some(format!("up to {}", k(max))),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedJob {
    #[serde(flatten)]
    pub job: Job,
    pub match_score: f64,
}

/// Search filters shared by both backends. Unset fields are not sent.
/// `skip` is understood by the primary backend, `page` by the listings one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobSearchParams {
    pub query: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub job_type: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub page: Option<u32>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSearchResponse {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperStatus {
    pub is_running: bool,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub jobs_scraped: u64,
    #[serde(default)]
    pub successful_sites: Vec<String>,
    #[serde(default)]
    pub failed_sites: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeTriggered {
    pub message: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(min: Option<f64>, max: Option<f64>) -> Job {
        serde_json::from_value(serde_json::json!({
            "id": "j-1",
            "title": "Rust Engineer",
            "company": "Acme",
            "salary_min": min,
            "salary_max": max,
            "created_at": "2025-01-05T08:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_salary_range() {
        assert_eq!(
            job(Some(120_000.0), Some(150_000.0)).salary_range().as_deref(),
            Some("$120k – $150k")
        );
        assert_eq!(
            job(Some(90_000.0), None).salary_range().as_deref(),
            Some("from $90k")
        );
        assert_eq!(job(None, None).salary_range(), None);
    }

    #[test]
    fn test_matched_job_flattens() {
        let matched: MatchedJob = serde_json::from_value(serde_json::json!({
            "id": "j-2",
            "title": "SRE",
            "company": "Initech",
            "created_at": "2025-01-05T08:00:00",
            "match_score": 91.0
        }))
        .unwrap();
        assert_eq!(matched.job.company, "Initech");
        assert_eq!(matched.match_score, 91.0);
    }
}
