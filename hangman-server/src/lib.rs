use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hangman_core::WordList;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::directory::UserDirectory;
use crate::game_manager::GameManager;
use crate::http::ConnectionManager;
use crate::http::handlers::RequestHandler;

pub mod auth;
pub mod config;
pub mod directory;
pub mod files;
pub mod game_manager;
pub mod http;
pub mod render;

/// Everything the accept loop hands to a connection task.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game_manager: Arc<GameManager>,
    pub connection_manager: Arc<ConnectionManager>,
}

impl AppState {
    /// Loads the dictionary and seeds the user directory. A missing or empty
    /// dictionary is fatal.
    pub fn new(config: Config) -> Result<Self> {
        let words_path = config.words_path();
        let word_list = WordList::from_file(&words_path)
            .with_context(|| format!("Failed to load dictionary {}", words_path.display()))?;

        let directory = UserDirectory::with_seed_users(config.user_count);
        info!("Seeded {} user accounts", directory.len());

        Ok(Self::with_parts(config, directory, word_list))
    }

    pub fn with_parts(config: Config, directory: UserDirectory, word_list: WordList) -> Self {
        Self {
            config: Arc::new(config),
            game_manager: Arc::new(GameManager::new(Arc::new(directory), Arc::new(word_list))),
            connection_manager: Arc::new(ConnectionManager::new()),
        }
    }

    pub fn request_handler(&self) -> RequestHandler {
        RequestHandler::new(self.config.clone(), self.game_manager.clone())
    }
}

/// Accepts connections until `shutdown` resolves, one task per connection.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let handler = state.request_handler();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let config = state.config.clone();
                    let handler = handler.clone();
                    let connection_manager = state.connection_manager.clone();
                    tokio::spawn(http::handle_connection(
                        stream,
                        Some(peer),
                        config,
                        handler,
                        connection_manager,
                    ));
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            },
        }
    }

    let open = state.connection_manager.connection_count().await;
    info!("Stopped accepting connections ({} still open)", open);
    Ok(())
}
