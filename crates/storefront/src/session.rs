//! Per-session context.
//!
//! A [`Session`] is created when a visitor starts using the shop and dropped
//! (or [`Session::end`]ed) at logout. Components receive it explicitly rather
//! than reading a global "current user".

use std::sync::Arc;

use common::{AccountId, UserId};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

/// Errors that can occur when using a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The user identity was already resolved for this session.
    #[error("Session is already authenticated")]
    AlreadyAuthenticated,

    /// The session was ended before a user signed in.
    #[error("Session has ended")]
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UserState {
    Pending,
    Ready(UserId),
    Ended,
}

/// Explicit session context.
///
/// The user identity resolves asynchronously and exactly once; callers that
/// need it await [`Session::ready`] instead of polling. Clones share state.
#[derive(Debug, Clone)]
pub struct Session {
    account_id: Option<AccountId>,
    user: Arc<watch::Sender<UserState>>,
}

impl Session {
    /// Starts a session with no signed-in user yet.
    pub fn new() -> Self {
        let (user, _) = watch::channel(UserState::Pending);
        Self {
            account_id: None,
            user: Arc::new(user),
        }
    }

    /// Starts a session for a known shop account.
    pub fn with_account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::new()
        }
    }

    /// The numeric account id used for order creation, if known.
    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    /// Resolves the user identity. Succeeds only once per session.
    #[tracing::instrument(skip(self))]
    pub fn authenticate(&self, user_id: UserId) -> Result<(), SessionError> {
        let mut outcome = Ok(());
        self.user.send_if_modified(|state| match state {
            UserState::Pending => {
                *state = UserState::Ready(user_id);
                true
            }
            UserState::Ready(_) => {
                outcome = Err(SessionError::AlreadyAuthenticated);
                false
            }
            UserState::Ended => {
                outcome = Err(SessionError::Ended);
                false
            }
        });
        if outcome.is_ok() {
            tracing::info!("session authenticated");
        }
        outcome
    }

    /// Signs in with a freshly generated anonymous identity.
    pub fn sign_in_anonymously(&self) -> Result<UserId, SessionError> {
        let user_id = UserId::new(format!("anon-{}", Uuid::new_v4()));
        self.authenticate(user_id.clone())?;
        Ok(user_id)
    }

    /// The signed-in user, without waiting.
    pub fn user(&self) -> Option<UserId> {
        match &*self.user.borrow() {
            UserState::Ready(user_id) => Some(user_id.clone()),
            _ => None,
        }
    }

    /// Waits until the user identity is resolved.
    ///
    /// Returns [`SessionError::Ended`] if the session ends first.
    pub async fn ready(&self) -> Result<UserId, SessionError> {
        let mut rx = self.user.subscribe();
        let state = rx
            .wait_for(|s| !matches!(s, UserState::Pending))
            .await
            .map_err(|_| SessionError::Ended)?;
        match &*state {
            UserState::Ready(user_id) => Ok(user_id.clone()),
            _ => Err(SessionError::Ended),
        }
    }

    /// Ends the session. Pending and future waiters get [`SessionError::Ended`].
    #[tracing::instrument(skip(self))]
    pub fn end(&self) {
        self.user.send_replace(UserState::Ended);
    }

    pub fn is_ended(&self) -> bool {
        matches!(*self.user.borrow(), UserState::Ended)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
