use std::sync::Arc;

use hangman_core::Account;
use hangman_types::AuthError;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

use crate::directory::UserDirectory;
use crate::http::request::{EMPTY_USER_SENTINEL, FormFields, field};

/// Exclusive hold on one account for the rest of a request.
pub type SessionGuard = OwnedMutexGuard<Account>;

/// Who a request says it is acting for.
#[derive(Debug)]
pub enum Identity {
    /// No `currentUser`, or the empty-user sentinel.
    Anonymous,
    /// A username taken from the request, not yet looked up.
    Claimed(String),
    /// A directory account, locked for this request.
    Authenticated(SessionGuard),
}

impl Identity {
    pub fn from_form(form: &FormFields) -> Self {
        match form.get(field::CURRENT_USER) {
            None | Some("") | Some(EMPTY_USER_SENTINEL) => Identity::Anonymous,
            Some(username) => Identity::Claimed(username.to_string()),
        }
    }
}

/// Maps request identities onto directory accounts.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    directory: Arc<UserDirectory>,
}

impl SessionResolver {
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Looks up a claimed identity and locks the account. Whether the account
    /// is logged in is left to the caller, since each transition has its own
    /// precondition.
    pub async fn resolve(&self, identity: Identity) -> Result<SessionGuard, AuthError> {
        match identity {
            Identity::Anonymous => Err(AuthError::Anonymous),
            Identity::Authenticated(guard) => Ok(guard),
            Identity::Claimed(username) => {
                let handle = self.directory.get(&username).ok_or_else(|| {
                    warn!("Request claimed unknown user {:?}", username);
                    AuthError::UnknownUser {
                        username: username.clone(),
                    }
                })?;
                debug!("Resolved session for {}", username);
                Ok(handle.lock_owned().await)
            }
        }
    }

    /// Attempts a login. On success the account is `LoggedIn` and stays
    /// locked in the returned guard.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionGuard, AuthError> {
        let handle = self.directory.get(username).ok_or_else(|| {
            warn!("Login attempt for unknown user {:?}", username);
            AuthError::InvalidCredentials
        })?;

        let mut account = handle.lock_owned().await;
        if let Err(e) = account.login(password) {
            warn!("Login failed for {}: {}", username, e);
            return Err(e);
        }

        Ok(account)
    }
}
