pub mod ai;
pub mod analytics;
pub mod application;
pub mod interview;
pub mod job;
pub mod resume;
pub mod timestamp;
pub mod user;

pub use ai::*;
pub use analytics::*;
pub use application::*;
pub use interview::*;
pub use job::*;
pub use resume::*;
pub use user::*;

use serde::Deserialize;

/// `{"message": "..."}` acknowledgement returned by several endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default)]
    pub success: Option<bool>,
}
