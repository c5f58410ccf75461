//! Session store: the single authority on who the client is logged in as.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store owns the only writer of the session channel. The HTTP binding
//! reads the token from it to sign requests, the navigator reads it to guard
//! transitions, and UI consumers subscribe to it to re-render.
//!
//! LIFECYCLE
//! =========
//! `open` restores a persisted token synchronously, so a returning user is
//! authenticated before any network call resolves. `start` also spawns the
//! profile refresh as a cancellable task and hands back its handle. Logout
//! tears the session down (token and user cleared, storage wiped).

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::storage::TokenStorage;
use crate::config::{ClientConfig, RefreshPolicy};
use crate::net::error::ApiError;
use crate::net::http::{CredentialSource, HttpClient};
use crate::net::types::{TokenResponse, UserProfile};

// =============================================================================
// SESSION
// =============================================================================

/// Snapshot of the authenticated client.
///
/// Fields are private: only the store produces sessions, which keeps
/// `user` set only while `token` is set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Authentication depends on token presence only, not on the profile.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[cfg(test)]
    pub(crate) fn with_token(token: &str) -> Self {
        Self { token: Some(token.to_owned()), user: None }
    }
}

/// Signs requests with whatever token the session currently holds.
struct SessionCredentials(watch::Receiver<Session>);

impl CredentialSource for SessionCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.0.borrow().token.clone()
    }
}

fn normalize_token(token: Option<&str>) -> Option<String> {
    token.map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned)
}

// =============================================================================
// REFRESH OUTCOME
// =============================================================================

/// Result of a profile refresh. Refresh never fails outright; the outcome
/// says what happened to the session.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// No token was present; nothing was requested.
    NoToken,
    /// The profile was fetched and stored.
    Loaded(UserProfile),
    /// The token changed while the request was in flight; result discarded.
    Superseded,
    /// The refresh failed and the session was logged out.
    LoggedOut(ApiError),
    /// The refresh failed but policy kept the session (transient failure).
    Kept(ApiError),
    /// The startup refresh task was cancelled or did not run to completion.
    Aborted,
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    state: watch::Sender<Session>,
    storage: Box<dyn TokenStorage>,
    http: HttpClient,
    policy: RefreshPolicy,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.is_authenticated())
            .field("has_user", &session.user.is_some())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create the store, restoring a persisted token if one exists.
    ///
    /// No network call is made. An unreadable store is logged and treated as
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP binding cannot be built.
    pub fn open<S>(config: &ClientConfig, storage: S) -> Result<Arc<Self>, ApiError>
    where
        S: TokenStorage + 'static,
    {
        let restored = match storage.load() {
            Ok(token) => normalize_token(token.as_deref()),
            Err(e) => {
                tracing::warn!(error = %e, "token storage unreadable; starting signed out");
                None
            }
        };
        if restored.is_some() {
            tracing::info!("restored persisted session token");
        }

        let (state, reader) = watch::channel(Session { token: restored, user: None });
        let http = HttpClient::new(config, Arc::new(SessionCredentials(reader)))?;
        Ok(Arc::new(Self { state, storage: Box::new(storage), http, policy: config.refresh_policy }))
    }

    /// [`open`](Self::open) and spawn the startup profile refresh.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP binding cannot be built.
    pub fn start<S>(config: &ClientConfig, storage: S) -> Result<(Arc<Self>, StartupRefresh), ApiError>
    where
        S: TokenStorage + 'static,
    {
        let store = Self::open(config, storage)?;
        let refresh = StartupRefresh::spawn(Arc::clone(&store));
        Ok((store, refresh))
    }

    /// The HTTP binding signed by this session.
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Replace the token, persisting it and re-signing subsequent requests.
    ///
    /// `None` (or a blank token) removes the persisted value and the
    /// credential. A different token drops the cached profile. Storage
    /// failures are logged; this never fails.
    ///
    /// Storage is written before the channel is locked, so readers are never
    /// blocked on file I/O. The write itself is synchronous.
    pub fn set_token(&self, token: Option<&str>) {
        let token = normalize_token(token);
        let persisted = match token.as_deref() {
            Some(value) => self.storage.save(value),
            None => self.storage.clear(),
        };
        if let Err(e) = persisted {
            tracing::warn!(error = %e, "failed to persist session token");
        }
        self.state.send_modify(|session| {
            if session.token != token {
                session.user = None;
            }
            session.token = token;
        });
    }

    /// Exchange credentials for a token, then load the profile.
    ///
    /// The profile refresh follows [`fetch_user`](Self::fetch_user) rules; a
    /// refresh failure does not fail the login.
    ///
    /// # Errors
    ///
    /// Propagates the login failure unchanged, typically
    /// [`ApiError::Authentication`] for rejected credentials.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<TokenResponse, ApiError> {
        let response = self.http.auth().login(identifier, secret).await.inspect_err(|e| {
            tracing::info!(code = e.error_code(), "login rejected");
        })?;
        self.set_token(Some(&response.access_token));
        tracing::info!("login succeeded");

        let outcome = self.fetch_user().await;
        tracing::debug!(?outcome, "post-login profile refresh");
        Ok(response)
    }

    /// Submit a registration; the server response is returned verbatim.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError::Validation`] / [`ApiError::Conflict`] unchanged.
    pub async fn register<B: Serialize + ?Sized>(&self, user_data: &B) -> Result<Value, ApiError> {
        self.http.auth().register(user_data).await
    }

    /// Clear token, persisted token and profile. Idempotent; no network call.
    pub fn logout(&self) {
        self.set_token(None);
        self.state.send_if_modified(|session| session.user.take().is_some());
        tracing::info!("logged out");
    }

    /// Load the current user's profile.
    ///
    /// A failure is never surfaced as an error: depending on the refresh
    /// policy the session is logged out or kept, and the outcome reports
    /// which. A result for a token that has since been replaced is dropped.
    pub async fn fetch_user(&self) -> RefreshOutcome {
        let Some(token) = self.token() else {
            return RefreshOutcome::NoToken;
        };

        match self.http.auth().me().await {
            Ok(profile) => {
                let stored = self.state.send_if_modified(|session| {
                    if session.token.as_deref() != Some(token.as_str()) {
                        return false;
                    }
                    session.user = Some(profile.clone());
                    true
                });
                if stored {
                    tracing::info!(user_id = %profile.user_id, "session profile loaded");
                    RefreshOutcome::Loaded(profile)
                } else {
                    RefreshOutcome::Superseded
                }
            }
            Err(error) => {
                if self.token().as_deref() != Some(token.as_str()) {
                    return RefreshOutcome::Superseded;
                }
                let logout = match self.policy {
                    RefreshPolicy::LogoutOnAnyFailure => true,
                    RefreshPolicy::LogoutOnRejection => error.is_credential_rejection(),
                };
                if logout {
                    tracing::warn!(code = error.error_code(), "profile refresh failed; logging out");
                    self.logout();
                    RefreshOutcome::LoggedOut(error)
                } else {
                    tracing::warn!(code = error.error_code(), "profile refresh failed; keeping session");
                    RefreshOutcome::Kept(error)
                }
            }
        }
    }
}

// =============================================================================
// STARTUP REFRESH
// =============================================================================

/// Handle to the profile refresh spawned at startup.
///
/// Lets the UI show a loading state instead of racing the first render, and
/// cancel the refresh. Dropping the handle detaches the task.
#[derive(Debug)]
pub struct StartupRefresh {
    handle: Option<JoinHandle<RefreshOutcome>>,
}

impl StartupRefresh {
    fn spawn(store: Arc<SessionStore>) -> Self {
        if !store.is_authenticated() {
            return Self { handle: None };
        }
        let handle = tokio::spawn(async move { store.fetch_user().await });
        Self { handle: Some(handle) }
    }

    /// Whether the refresh is still in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel the refresh. The session keeps its token.
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    /// Wait for the refresh to finish.
    pub async fn wait(self) -> RefreshOutcome {
        let Some(handle) = self.handle else {
            return RefreshOutcome::NoToken;
        };
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "startup refresh task failed");
                }
                RefreshOutcome::Aborted
            }
        }
    }
}
