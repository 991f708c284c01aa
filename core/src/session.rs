//! Authentication session state machine.
//!
//! # Design
//! `AuthSession` is the only writer of the persisted token. Its state starts
//! at `Unknown`, moves to `LoggedIn` or `LoggedOut` on the one-time
//! `restore`, and then flips between those two on `login` / `logout`.
//!
//! State lives in a `tokio::sync::watch` channel so UI code can subscribe to
//! transitions. Transitions are not serialized against each other: if
//! `login` and `logout` race, whichever publishes last wins.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::HttpJsonClient;
use crate::error::{ApiError, StorageError};
use crate::http::HttpMethod;
use crate::storage::{KeyValueStore, TOKEN_KEY};
use crate::types::{SignupRequest, TokenResponse, UserProfile};

const TOKEN_PATH: &str = "/token";
const SIGNUP_PATH: &str = "/users/signup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The persisted store has not been read yet.
    Unknown,
    LoggedOut,
    LoggedIn,
}

/// Snapshot of the session. `token` is non-empty iff `status` is `LoggedIn`.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: SessionStatus,
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    fn unknown() -> Self {
        Self {
            status: SessionStatus::Unknown,
            token: None,
            user: None,
        }
    }

    fn logged_out() -> Self {
        Self {
            status: SessionStatus::LoggedOut,
            token: None,
            user: None,
        }
    }

    fn logged_in(token: String, user: UserProfile) -> Self {
        Self {
            status: SessionStatus::LoggedIn,
            token: Some(token),
            user: Some(user),
        }
    }
}

pub struct AuthSession {
    client: HttpJsonClient,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<Session>,
}

impl AuthSession {
    pub fn new(client: HttpJsonClient, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(Session::unknown());
        Self { client, store, state }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    /// Receiver that observes every transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Load the persisted token once. A stored token is trusted as-is; a
    /// storage failure reads as logged out. Later calls are no-ops.
    pub async fn restore(&self) -> SessionStatus {
        if self.status() != SessionStatus::Unknown {
            return self.status();
        }

        let next = match self.store.get(TOKEN_KEY).await {
            Ok(Some(token)) if !token.is_empty() => Session::logged_in(token, UserProfile::placeholder()),
            Ok(_) => Session::logged_out(),
            Err(e) => {
                warn!(error = %e, "failed to read stored token");
                Session::logged_out()
            }
        };

        // A login that finished while we were reading takes precedence.
        self.state.send_if_modified(|current| {
            if current.status == SessionStatus::Unknown {
                *current = next;
                true
            } else {
                false
            }
        });

        let status = self.status();
        info!(?status, "session restored");
        status
    }

    /// Exchange credentials for a token, persist it and publish `LoggedIn`.
    /// On any failure the session is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let result = self.try_login(email, password).await;
        if let Err(e) = &result {
            warn!(error = %e, "login failed");
        }
        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let value = self
            .client
            .request_form(
                HttpMethod::Post,
                TOKEN_PATH,
                &[("username", email), ("password", password)],
            )
            .await?;

        let response = match value {
            Value::Object(map) => TokenResponse::from(map),
            _ => return Err(ApiError::Credential),
        };
        let token = response.bearer().ok_or(ApiError::Credential)?.to_string();

        self.store.set(TOKEN_KEY, &token).await?;

        let user = match response.user {
            None => UserProfile::placeholder(),
            Some(raw) => UserProfile::from_json(raw).unwrap_or_else(|| {
                warn!("login response carried a non-object user, using placeholder");
                UserProfile::placeholder()
            }),
        };
        let session = Session::logged_in(token, user);
        self.state.send_replace(session.clone());
        info!("logged in");
        Ok(session)
    }

    /// Register a new account. Does not log in.
    pub async fn signup(&self, profile: &SignupRequest) -> Result<Value, ApiError> {
        let result = self
            .client
            .request_json(HttpMethod::Post, SIGNUP_PATH, Some(profile), &[])
            .await;
        if let Err(e) = &result {
            warn!(error = %e, "signup failed");
        }
        result
    }

    /// Drop the persisted token and publish `LoggedOut`. The transition
    /// happens even when removal fails; the storage error is still returned.
    pub async fn logout(&self) -> Result<(), StorageError> {
        let removed = self.store.remove(TOKEN_KEY).await;
        self.state.send_replace(Session::logged_out());
        match &removed {
            Ok(()) => info!("logged out"),
            Err(e) => warn!(error = %e, "logged out but failed to remove stored token"),
        }
        removed
    }
}
