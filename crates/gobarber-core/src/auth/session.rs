use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, RemoteAuthService};
use crate::models::{AuthResponse, UserProfile};
use crate::storage::{KeyValueStorage, StorageError, TOKEN_KEY, USER_KEY};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Authentication failed: {0}")]
    Authentication(#[source] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A bearer token together with the user it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub token: String,
    pub user: UserProfile,
}

/// What the store currently knows about the user.
///
/// A token is never held without its user. `ProfileOnly` only comes from
/// updating the profile while signed out.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    ProfileOnly(UserProfile),
    SignedIn(SessionData),
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::SignedIn(data) => Some(data.token.as_str()),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            SessionState::SignedIn(data) => Some(&data.user),
            SessionState::ProfileOnly(user) => Some(user),
            SessionState::SignedOut => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn(_))
    }
}

/// Owns the signed-in session and keeps it mirrored to storage.
///
/// Build one per process and hand it (usually behind an `Arc`) to whatever
/// needs the session. State changes are published through a watch channel;
/// subscribers only ever see whole states.
pub struct SessionStore<A, S> {
    auth: A,
    storage: S,
    state: watch::Sender<SessionState>,
    /// Serializes storage writes with the matching publish
    commit: Mutex<()>,
}

impl<A, S> SessionStore<A, S>
where
    A: RemoteAuthService,
    S: KeyValueStorage,
{
    /// Create a store, restoring any session found in storage
    pub fn new(auth: A, storage: S) -> Self {
        let initial = Self::restore(&storage);
        debug!(authenticated = initial.is_authenticated(), "Session store initialized");
        let (state, _) = watch::channel(initial);
        Self {
            auth,
            storage,
            state,
            commit: Mutex::new(()),
        }
    }

    /// Read the persisted entries. Anything missing, unreadable or
    /// malformed counts as signed out.
    fn restore(storage: &S) -> SessionState {
        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, starting signed out");
                return SessionState::SignedOut;
            }
        };
        let user = match storage.get(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user, starting signed out");
                return SessionState::SignedOut;
            }
        };

        match (token, user) {
            (Some(token), Some(raw_user)) => match serde_json::from_str::<UserProfile>(&raw_user) {
                Ok(user) => SessionState::SignedIn(SessionData { token, user }),
                Err(e) => {
                    warn!(error = %e, "Stored user is malformed, starting signed out");
                    SessionState::SignedOut
                }
            },
            _ => SessionState::SignedOut,
        }
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exchange credentials for a session, persist it, then publish it.
    ///
    /// On failure the current session and the stored entries are left as
    /// they were.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionData, SessionError> {
        let AuthResponse { user, token } = self
            .auth
            .authenticate(email, password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Sign-in failed");
                SessionError::Authentication(e)
            })?;

        let user_json = serde_json::to_string(&user).map_err(StorageError::from)?;
        let data = SessionData { token, user };

        let _guard = self.lock_commit();
        let previous_token = self.state.borrow().token().map(str::to_string);

        self.storage.set(TOKEN_KEY, &data.token)?;
        if let Err(e) = self.storage.set(USER_KEY, &user_json) {
            error!(error = %e, "Failed to store user, rolling back token");
            self.restore_token_entry(previous_token.as_deref());
            return Err(e.into());
        }

        self.state.send_replace(SessionState::SignedIn(data.clone()));
        info!(user_id = %data.user.id, "Signed in");
        Ok(data)
    }

    fn restore_token_entry(&self, previous: Option<&str>) {
        let result = match previous {
            Some(token) => self.storage.set(TOKEN_KEY, token),
            None => self.storage.remove(TOKEN_KEY),
        };
        if let Err(e) = result {
            error!(error = %e, "Failed to roll back stored token");
        }
    }

    /// Forget the session, both in storage and in memory.
    ///
    /// Safe to call when already signed out. Storage failures are logged
    /// and the in-memory session is cleared regardless.
    pub fn sign_out(&self) {
        let _guard = self.lock_commit();
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove stored session entry");
            }
        }
        self.state.send_replace(SessionState::SignedOut);
        info!("Signed out");
    }

    /// Replace the current user profile and persist it. The token is not
    /// touched.
    pub fn update_user(&self, profile: UserProfile) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(&profile).map_err(StorageError::from)?;

        let _guard = self.lock_commit();
        self.storage.set(USER_KEY, &user_json)?;

        let user_id = profile.id.clone();
        self.state.send_modify(move |state| {
            *state = match std::mem::take(state) {
                SessionState::SignedIn(data) => SessionState::SignedIn(SessionData {
                    token: data.token,
                    user: profile,
                }),
                _ => SessionState::ProfileOnly(profile),
            };
        });
        debug!(user_id = %user_id, "User profile updated");
        Ok(())
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }
}

// ============================================================================
// Tests
// ============================================================================
