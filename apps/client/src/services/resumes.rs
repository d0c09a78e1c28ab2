use std::path::Path;

use bytes::Bytes;
use uuid::Uuid;

use crate::api_client::{ApiClient, MultipartForm};
use crate::errors::ClientError;
use crate::models::{Resume, ResumeUpdate};

pub struct Resumes<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn resumes(&self) -> Resumes<'_> {
        Resumes { api: self }
    }
}

/// MIME type the resume analyzer expects for a given file name.
pub fn resume_mime(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "doc" => Some("application/msword"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

impl Resumes<'_> {
    pub async fn list(&self) -> Result<Vec<Resume>, ClientError> {
        self.api.get_json("/api/v1/resumes").await
    }

    pub async fn get(&self, id: Uuid) -> Result<Resume, ClientError> {
        self.api.get_json(&format!("/api/v1/resumes/{id}")).await
    }

    /// POST /api/v1/resumes/upload (multipart: `file`, `title`)
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: impl Into<Bytes>,
        title: &str,
    ) -> Result<Resume, ClientError> {
        let form = MultipartForm::new()
            .file("file", file_name, resume_mime(file_name), bytes)
            .text("title", title);
        self.api.post_multipart("/api/v1/resumes/upload", form).await
    }

    pub async fn update(&self, id: Uuid, update: &ResumeUpdate) -> Result<Resume, ClientError> {
        self.api
            .put_json(&format!("/api/v1/resumes/{id}"), update)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete(&format!("/api/v1/resumes/{id}")).await
    }

    pub async fn set_primary(&self, id: Uuid) -> Result<Resume, ClientError> {
        self.api
            .post_empty(&format!("/api/v1/resumes/{id}/set-primary"))
            .await
    }

    /// Runs the analyzer and returns the scored resume.
    pub async fn analyze(&self, id: Uuid) -> Result<Resume, ClientError> {
        self.api
            .post_empty(&format!("/api/v1/resumes/{id}/analyze"))
            .await
    }

    /// Raw bytes of the originally uploaded file.
    pub async fn download(&self, id: Uuid) -> Result<Bytes, ClientError> {
        self.api
            .get_bytes(&format!("/api/v1/resumes/{id}/download"))
            .await
    }
}
