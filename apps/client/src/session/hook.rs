use tracing::warn;

use crate::errors::ExpiryReason;

/// Side effect run once per terminal session loss, after both credentials
/// have been cleared. A browser front end would navigate to its login page.
pub trait SessionExpiredHook: Send + Sync {
    fn session_expired(&self, reason: &ExpiryReason);
}

/// Default hook for the command-line front end: tell the user how to sign in.
pub struct LoginPrompt {
    command: String,
}

impl LoginPrompt {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for LoginPrompt {
    fn default() -> Self {
        Self::new("jobdeck login")
    }
}

impl SessionExpiredHook for LoginPrompt {
    fn session_expired(&self, reason: &ExpiryReason) {
        warn!(%reason, "Session expired; sign in again with `{}`", self.command);
    }
}
