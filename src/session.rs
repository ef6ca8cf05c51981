// src/session.rs
//! Session Store: owns the single active [`Session`] and its lifecycle.
//!
//! ```text
//! Initializing --restore--> Authenticated | Anonymous
//! Anonymous    --login----> Authenticated
//! Authenticated --logout--> Anonymous
//! ```
//!
//! State changes are published on a `watch` channel so any number of
//! consumers can observe them; only the store mutates.

use crate::api::Api;
use crate::error::{ApiError, StorageError};
use crate::models::{Credentials, Session, UserOut};
use crate::notify::Notifier;
use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Login responses carry no identity, so the stored user gets this id.
pub const PLACEHOLDER_USER_ID: i64 = 0;

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const REGISTER_SUCCESS: &str = "Registration successful! You can now log in.";
pub const LOGOUT_INFO: &str = "You have been logged out";
pub const LOGIN_REQUIRED: &str = "You need to be logged in";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Authenticated,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub phase: Phase,
    pub session: Option<Session>,
}

impl AuthState {
    fn initializing() -> Self {
        Self {
            phase: Phase::Initializing,
            session: None,
        }
    }

    fn anonymous() -> Self {
        Self {
            phase: Phase::Anonymous,
            session: None,
        }
    }

    fn authenticated(session: Session) -> Self {
        Self {
            phase: Phase::Authenticated,
            session: Some(session),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == Phase::Authenticated && self.session.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Initializing
    }

    pub fn user(&self) -> Option<&UserOut> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }
}

pub struct SessionStore {
    api: Api,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    /// Starts in `Initializing`; call [`restore`](Self::restore) or
    /// [`restore_in_background`](Self::restore_in_background) next.
    pub fn new(api: Api, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(AuthState::initializing());
        Self {
            api,
            storage,
            state,
        }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    fn notifier(&self) -> &Arc<dyn Notifier> {
        self.api.notifier()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn user(&self) -> Option<UserOut> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// The active session, or `ValidationFailed` when nobody is logged in.
    pub fn require_session(&self) -> Result<Session, ApiError> {
        self.state
            .borrow()
            .session
            .clone()
            .ok_or_else(|| ApiError::validation(LOGIN_REQUIRED))
    }

    /// Leaves `Initializing` using whatever was persisted. Never fails: a
    /// missing or unreadable record means `Anonymous`. Has no effect once
    /// the store has left `Initializing`.
    pub fn restore(&self) -> AuthState {
        if self.phase() != Phase::Initializing {
            return self.state();
        }

        let next = match self.load_persisted() {
            Ok(Some(session)) => {
                info!("Restored session for {}", session.user.email);
                AuthState::authenticated(session)
            }
            Ok(None) => AuthState::anonymous(),
            Err(e) => {
                warn!("Failed to load auth state: {}", e);
                AuthState::anonymous()
            }
        };

        self.state.send_if_modified(|current| {
            if current.phase != Phase::Initializing {
                return false;
            }
            *current = next;
            true
        });
        self.state()
    }

    /// Runs [`restore`](Self::restore) off the caller's task so the first
    /// render can observe `is_loading`.
    pub fn restore_in_background(self: &Arc<Self>) -> JoinHandle<AuthState> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.restore())
    }

    fn load_persisted(&self) -> Result<Option<Session>, StorageError> {
        let token = match self.storage.get(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        let raw_user = match self.storage.get(USER_KEY)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let user: UserOut = serde_json::from_str(&raw_user)?;
        Ok(Some(Session { token, user }))
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)?;
        self.storage.set(TOKEN_KEY, &session.token)?;
        self.storage.set(USER_KEY, &user)?;
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let token = self.api.auth().login(credentials).await?;
        if token.access_token.is_empty() {
            return Err(self.api.report(ApiError::request_failed(
                "login response did not include an access token",
            )));
        }

        let session = Session {
            token: token.access_token,
            user: UserOut {
                id: PLACEHOLDER_USER_ID,
                email: credentials.email.clone(),
            },
        };

        if let Err(e) = self.persist(&session) {
            warn!("Session for {} will not survive a restart: {}", session.user.email, e);
        }

        self.state.send_replace(AuthState::authenticated(session.clone()));
        info!("Logged in as {}", session.user.email);
        self.notifier().success(LOGIN_SUCCESS);
        Ok(session)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, credentials: &Credentials) -> Result<UserOut, ApiError> {
        let user = self.api.auth().register(credentials).await?;
        self.notifier().success(REGISTER_SUCCESS);
        Ok(user)
    }

    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to clear stored {}: {}", key, e);
            }
        }

        self.state.send_replace(AuthState::anonymous());
        info!("Session cleared");
        self.notifier().info(LOGOUT_INFO);
    }
}
