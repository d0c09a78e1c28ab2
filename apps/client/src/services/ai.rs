use serde_json::Value;

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{
    ChatReply, ChatRequest, CoverLetter, CoverLetterRequest, InterviewQuestions,
    InterviewQuestionsRequest,
};

/// Text generation is delegated to the backend's AI service; these calls can
/// take a while, so they share the client's timeout rather than a shorter one.
pub struct Ai<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn ai(&self) -> Ai<'_> {
        Ai { api: self }
    }
}

impl Ai<'_> {
    pub async fn cover_letter(&self, request: &CoverLetterRequest) -> Result<CoverLetter, ClientError> {
        self.api.post_json("/api/v1/ai/cover-letter", request).await
    }

    pub async fn interview_questions(
        &self,
        request: &InterviewQuestionsRequest,
    ) -> Result<InterviewQuestions, ClientError> {
        self.api
            .post_json("/api/v1/ai/interview/questions", request)
            .await
    }

    pub async fn chat(&self, message: &str, context: Option<&Value>) -> Result<ChatReply, ClientError> {
        self.api
            .post_json("/api/v1/ai/chat", &ChatRequest { message, context })
            .await
    }
}
