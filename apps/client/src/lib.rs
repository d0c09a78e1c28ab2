//! JobDeck client library: an authenticated API client with single-flight
//! credential refresh, typed resources for the job-search tracker backends,
//! and client-side stores mirroring them.

pub mod api_client;
pub mod config;
pub mod errors;
pub mod jobs_backend;
pub mod models;
pub mod services;
pub mod session;
pub mod stores;

pub use api_client::ApiClient;
pub use config::Config;
pub use errors::{ClientError, ExpiryReason, RefreshError, StoreError};
pub use jobs_backend::JobsApiClient;
pub use session::SessionManager;
