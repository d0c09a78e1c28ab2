pub mod hook;
pub mod manager;
pub mod refresher;
pub mod store;

pub use hook::{LoginPrompt, SessionExpiredHook};
pub use manager::SessionManager;
pub use refresher::{HttpTokenRefresher, TokenRefresher, TokenResponse, REFRESH_PATH};
pub use store::{FileTokenStore, MemoryTokenStore, TokenPair, TokenStore};
