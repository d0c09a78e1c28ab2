use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct CoverLetterRequest {
    pub resume_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    /// e.g. "professional" (server default), "enthusiastic", "concise".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    /// "short", "medium" or "long".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetter {
    pub letter: String,
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Technical,
    Behavioral,
    SystemDesign,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewQuestionsRequest {
    pub job_id: Uuid,
    pub interview_type: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub guidance: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestions {
    pub job_id: Uuid,
    pub interview_type: QuestionKind,
    pub questions: Vec<InterviewQuestion>,
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}
