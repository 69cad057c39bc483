use std::collections::HashMap;
use std::sync::Arc;

use hangman_core::Account;
use tokio::sync::Mutex;

/// Shared handle to one account. Holding the lock gives exclusive access to
/// the account and its game for the duration of one request.
pub type AccountHandle = Arc<Mutex<Account>>;

/// Process-wide table of accounts.
///
/// Membership is fixed once the directory is built, so lookups need no lock;
/// only the accounts themselves are mutable, each behind its own mutex.
#[derive(Debug, Default)]
pub struct UserDirectory {
    accounts: HashMap<String, AccountHandle>,
}

impl UserDirectory {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.username().to_string(), Arc::new(Mutex::new(account))))
            .collect();

        Self { accounts }
    }

    /// The fixed seed list: `admin`/`password`, then `userN`/`passwordN`.
    pub fn with_seed_users(count: usize) -> Self {
        let seeds = (0..count).map(|i| {
            if i == 0 {
                Account::new("admin", "password")
            } else {
                Account::new(format!("user{}", i), format!("password{}", i))
            }
        });

        Self::new(seeds)
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, username: &str) -> Option<AccountHandle> {
        self.accounts.get(username).cloned()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Number of accounts currently logged in.
    pub async fn logged_in_count(&self) -> usize {
        let mut count = 0;
        for account in self.accounts.values() {
            if account.lock().await.is_logged_in() {
                count += 1;
            }
        }
        count
    }
}
