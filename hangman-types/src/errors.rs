use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GameError {
    #[error("No game in progress")]
    NotInProgress,
    #[error("User is not logged in")]
    NotLoggedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AuthError {
    #[error("Unknown user: {username}")]
    UnknownUser { username: String },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User already logged in")]
    AlreadyLoggedIn,
    #[error("User is not logged in")]
    NotLoggedIn,
    #[error("No session")]
    Anonymous,
}
