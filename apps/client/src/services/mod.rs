//! Typed REST resources of the primary backend.
//!
//! Each handle borrows the `ApiClient` and is a direct, sequential wrapper
//! around its `request` path; session recovery happens underneath.

pub mod ai;
pub mod analytics;
pub mod applications;
pub mod auth;
pub mod interviews;
pub mod jobs;
pub mod resumes;
pub mod users;

pub use ai::Ai;
pub use analytics::Analytics;
pub use applications::Applications;
pub use auth::Auth;
pub use interviews::Interviews;
pub use jobs::Jobs;
pub use resumes::Resumes;
pub use users::Users;
