//! Client-side state mirrors of the REST resources.
//!
//! Each store owns an `ApiClient` handle, the last fetched data, and a
//! `StoreStatus`. Reads record failures in `status.error`; mutations record
//! them and also hand the error back to the caller.

pub mod analytics;
pub mod applications;
pub mod auth;
pub mod interviews;
pub mod jobs;
pub mod resumes;

pub use analytics::AnalyticsStore;
pub use applications::ApplicationStore;
pub use auth::AuthStore;
pub use interviews::InterviewStore;
pub use jobs::JobStore;
pub use resumes::ResumeStore;

use crate::errors::ClientError;

/// Loading flag plus the last user-facing error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

impl StoreStatus {
    pub(crate) fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Ends the operation. On failure the server's detail is kept verbatim,
    /// `fallback` otherwise.
    pub(crate) fn settle<T>(
        &mut self,
        result: Result<T, ClientError>,
        fallback: &str,
    ) -> Result<T, ClientError> {
        self.is_loading = false;
        if let Err(e) = &result {
            self.error = Some(e.detail_or(fallback));
        }
        result
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_keeps_server_detail() {
        let mut status = StoreStatus::default();
        status.begin();
        assert!(status.is_loading);

        let result: Result<(), _> = status.settle(
            Err(ClientError::Api {
                status: 400,
                message: "Resume title already exists".into(),
            }),
            "Failed to upload resume",
        );
        assert!(result.is_err());
        assert!(!status.is_loading);
        assert_eq!(status.error.as_deref(), Some("Resume title already exists"));

        status.clear_error();
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_settle_falls_back_for_transport_failures() {
        let mut status = StoreStatus::default();
        status.begin();
        let _ = status.settle::<()>(
            Err(ClientError::Configuration("offline".into())),
            "Failed to fetch resumes",
        );
        assert_eq!(status.error.as_deref(), Some("Failed to fetch resumes"));
    }
}
