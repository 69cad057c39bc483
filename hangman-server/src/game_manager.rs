use std::sync::Arc;

use hangman_core::WordList;
use hangman_types::{AuthError, GameError, GameView};
use tracing::{debug, error, info, warn};

use crate::auth::{Identity, SessionGuard, SessionResolver};
use crate::directory::UserDirectory;
use crate::http::request::{FormFields, field};

/// What a form submission asks for. When a form carries several markers the
/// first match in declaration order wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Guess { letter: String },
    StartNewGame,
    Logout,
    /// No command: re-render for a logged-in user.
    View,
}

impl Command {
    pub fn from_form(form: &FormFields) -> Self {
        if let (Some(username), Some(password)) =
            (form.get(field::USERNAME), form.get(field::PASSWORD))
        {
            return Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            };
        }
        if let Some(letter) = form.get(field::GUESSED_LETTER) {
            return Command::Guess {
                letter: letter.to_string(),
            };
        }
        if form.contains(field::START_NEW_GAME) {
            return Command::StartNewGame;
        }
        if form.contains(field::LOGOUT) {
            return Command::Logout;
        }
        Command::View
    }
}

/// The surface a request ends up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Game(GameView),
    Login,
    NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Could not pick a word: {0}")]
    Dictionary(anyhow::Error),
}

pub struct GameManager {
    resolver: SessionResolver,
    word_list: Arc<WordList>,
}

impl GameManager {
    pub fn new(directory: Arc<UserDirectory>, word_list: Arc<WordList>) -> Self {
        Self {
            resolver: SessionResolver::new(directory),
            word_list,
        }
    }

    pub fn directory(&self) -> &UserDirectory {
        self.resolver.directory()
    }

    /// Runs one form submission through session resolution and the game
    /// state machine. Any rejection lands on the login page and leaves every
    /// account untouched.
    pub async fn handle_form(&self, form: &FormFields) -> Page {
        let command = Command::from_form(form);
        debug!("Handling command {:?}", redacted(&command));

        match self.apply(command, Identity::from_form(form)).await {
            Ok(page) => page,
            Err(CommandError::Dictionary(e)) => {
                error!("Dictionary unavailable: {}", e);
                Page::NotFound
            }
            Err(e) => {
                warn!("Request rejected: {}", e);
                Page::Login
            }
        }
    }

    async fn apply(&self, command: Command, identity: Identity) -> Result<Page, CommandError> {
        let identity = match &command {
            Command::Login { username, password } => {
                Identity::Authenticated(self.resolver.login(username, password).await?)
            }
            _ => identity,
        };
        let mut account = self.resolver.resolve(identity).await?;

        match command {
            Command::Login { .. } | Command::View => {}
            Command::Guess { letter } => {
                let outcome = account.guess(&letter)?;
                debug!("Guess {:?} by {}: {:?}", letter, account.username(), outcome);
            }
            Command::StartNewGame => self.start_game(&mut account)?,
            Command::Logout => {
                account.logout()?;
                return Ok(Page::Login);
            }
        }

        Ok(Page::Game(account.take_view()?))
    }

    fn start_game(&self, account: &mut SessionGuard) -> Result<(), CommandError> {
        if !account.is_logged_in() {
            return Err(GameError::NotLoggedIn.into());
        }

        let word = self
            .word_list
            .random_word(&mut rand::thread_rng())
            .map_err(CommandError::Dictionary)?
            .to_string();
        account.start_game(&word)?;
        info!("New game for {}", account.username());
        Ok(())
    }
}

/// Keeps passwords out of the logs.
fn redacted(command: &Command) -> Command {
    match command {
        Command::Login { username, .. } => Command::Login {
            username: username.clone(),
            password: "***".to_string(),
        },
        other => other.clone(),
    }
}
