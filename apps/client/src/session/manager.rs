//! Session manager: owns the live credential pair and coordinates refreshes.
//!
//! At most one refresh exchange is outstanding. Callers that hit a 401 while
//! it runs wait on a oneshot channel and are resumed, in the order they
//! queued, with the exchange's outcome. State is guarded by a std mutex that
//! is never held across an `.await`; writes to the backing store are
//! serialized by an async mutex so the store never disagrees with memory.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

use crate::errors::{ExpiryReason, RefreshError, StoreError};
use crate::session::hook::SessionExpiredHook;
use crate::session::refresher::TokenRefresher;
use crate::session::store::{TokenPair, TokenStore};

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

#[derive(Default)]
struct SessionState {
    tokens: Option<TokenPair>,
    refresh_in_flight: bool,
    waiters: VecDeque<Waiter>,
}

enum Recovery {
    /// Another caller already replaced the token this request was sent with.
    Current(String),
    Wait(oneshot::Receiver<Result<String, RefreshError>>),
    Lead(Option<String>),
}

enum TokenUpdate {
    Keep,
    Replace(TokenPair),
}

pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    hook: Arc<dyn SessionExpiredHook>,
    state: Mutex<SessionState>,
    persist: AsyncMutex<()>,
}

impl SessionManager {
    /// Builds a manager from whatever the store has persisted.
    /// An unreadable store is logged and treated as signed out.
    pub async fn load(
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        hook: Arc<dyn SessionExpiredHook>,
    ) -> Self {
        let tokens = match store.load().await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Ignoring unreadable stored credentials: {e}");
                None
            }
        };

        Self {
            store,
            refresher,
            hook,
            state: Mutex::new(SessionState {
                tokens,
                ..SessionState::default()
            }),
            persist: AsyncMutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().tokens.as_ref().map(|t| t.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().tokens.is_some()
    }

    pub fn refresh_in_flight(&self) -> bool {
        self.lock().refresh_in_flight
    }

    pub fn queued_waiters(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Adopts a freshly issued pair (after login) and persists it.
    pub async fn establish(&self, pair: TokenPair) -> Result<(), StoreError> {
        let _persist = self.persist.lock().await;
        self.store.save(&pair).await?;
        self.lock().tokens = Some(pair);
        info!("Session established");
        Ok(())
    }

    /// Voluntary sign-out: both credentials go, no expiry signal.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        let _persist = self.persist.lock().await;
        self.lock().tokens = None;
        self.store.clear().await
    }

    /// Terminal session loss: clears both credentials and fires the hook.
    pub async fn expire(&self, reason: ExpiryReason) {
        {
            let _persist = self.persist.lock().await;
            self.lock().tokens = None;
            self.clear_store().await;
        }
        warn!(%reason, "Session expired");
        self.hook.session_expired(&reason);
    }

    /// Obtains a usable access token after a request sent with `used_token`
    /// was rejected with 401.
    ///
    /// Only the first caller performs the exchange; everyone arriving while
    /// it runs queues behind it and receives the same outcome. On failure the
    /// session is expired exactly once, by the caller that led the exchange.
    pub async fn recover(&self, used_token: Option<&str>) -> Result<String, RefreshError> {
        let recovery = {
            let mut state = self.lock();
            if state.refresh_in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Recovery::Wait(rx)
            } else if let Some(current) = state
                .tokens
                .as_ref()
                .map(|t| &t.access_token)
                .filter(|current| Some(current.as_str()) != used_token)
                .cloned()
            {
                Recovery::Current(current)
            } else {
                state.refresh_in_flight = true;
                Recovery::Lead(state.tokens.as_ref().map(|t| t.refresh_token.clone()))
            }
        };

        match recovery {
            Recovery::Current(token) => {
                debug!("Credentials were refreshed by another caller; reusing them");
                Ok(token)
            }
            Recovery::Wait(rx) => {
                debug!("Refresh already in flight; queued behind it");
                rx.await.unwrap_or(Err(RefreshError::Abandoned))
            }
            Recovery::Lead(refresh_token) => self.lead_refresh(refresh_token).await,
        }
    }

    async fn lead_refresh(&self, refresh_token: Option<String>) -> Result<String, RefreshError> {
        let mut flight = Flight {
            manager: self,
            settled: false,
        };

        let outcome = match refresh_token.as_deref() {
            Some(refresh_token) => self.refresher.refresh(refresh_token).await,
            None => Err(RefreshError::MissingRefreshToken),
        };

        let _persist = self.persist.lock().await;
        match outcome {
            Ok(pair) => {
                if let Err(e) = self.store.save(&pair).await {
                    warn!("Failed to persist refreshed credentials: {e}");
                }
                let access_token = pair.access_token.clone();
                let resumed = flight.settle(TokenUpdate::Replace(pair), Ok(access_token.clone()));
                info!(resumed, "Credentials refreshed");
                Ok(access_token)
            }
            Err(err) => {
                if let Some(token) = self.clear_unless_replaced(refresh_token.as_deref()) {
                    // A sign-in landed while the exchange ran; its pair stands.
                    let resumed = flight.settle(TokenUpdate::Keep, Ok(token.clone()));
                    info!(resumed, "Refresh failed but a new session was established meanwhile");
                    return Ok(token);
                }
                self.clear_store().await;
                let rejected = flight.settle(TokenUpdate::Keep, Err(err.clone()));
                warn!(rejected, "Credential refresh failed: {err}");
                self.hook.session_expired(&ExpiryReason::Refresh(err.clone()));
                Err(err)
            }
        }
    }

    /// Ends the in-flight refresh: applies `update`, clears the flag and
    /// drains the queue in one critical section, then resumes every waiter.
    fn finish_flight(&self, update: TokenUpdate, result: &Result<String, RefreshError>) -> usize {
        let waiters = {
            let mut state = self.lock();
            match update {
                TokenUpdate::Keep => {}
                TokenUpdate::Replace(pair) => state.tokens = Some(pair),
            }
            state.refresh_in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        let count = waiters.len();
        for waiter in waiters {
            // A waiter whose request was dropped no longer listens.
            let _ = waiter.send(result.clone());
        }
        count
    }

    /// Drops the in-memory pair if it is still the one whose refresh token
    /// was exchanged. Otherwise returns the access token that replaced it.
    fn clear_unless_replaced(&self, exchanged: Option<&str>) -> Option<String> {
        let mut state = self.lock();
        let replacement = state
            .tokens
            .as_ref()
            .filter(|t| Some(t.refresh_token.as_str()) != exchanged)
            .map(|t| t.access_token.clone());
        if replacement.is_none() {
            state.tokens = None;
        }
        replacement
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear stored credentials: {e}");
        }
    }
}

/// Marks the leader's exchange. If the leader is dropped mid-exchange the
/// queue is released with `Abandoned` instead of waiting forever.
struct Flight<'a> {
    manager: &'a SessionManager,
    settled: bool,
}

impl Flight<'_> {
    fn settle(&mut self, update: TokenUpdate, result: Result<String, RefreshError>) -> usize {
        self.settled = true;
        self.manager.finish_flight(update, &result)
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Credential refresh abandoned; releasing queued requests");
            self.manager
                .finish_flight(TokenUpdate::Keep, &Err(RefreshError::Abandoned));
        }
    }
}
