use serde::{Deserialize, Serialize};

/// Whether an account currently has a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn,
}

/// Cumulative per-account statistics. Both counters only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub wins: u32,
    pub total_games: u32,
}
