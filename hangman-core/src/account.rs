use hangman_types::{
    AuthError, GameError, GameStatus, GameView, GuessOutcome, SessionState, UserStats,
};
use tracing::info;

use crate::Game;

/// A registered user together with the one game it owns.
#[derive(Debug, Clone)]
pub struct Account {
    username: String,
    password: String,
    stats: UserStats,
    session: SessionState,
    game: Game,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            stats: UserStats::default(),
            session: SessionState::LoggedOut,
            game: Game::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn stats(&self) -> UserStats {
        self.stats
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.session == SessionState::LoggedIn
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Opens a session. The password is compared verbatim.
    pub fn login(&mut self, password: &str) -> Result<(), AuthError> {
        if self.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        if self.is_logged_in() {
            return Err(AuthError::AlreadyLoggedIn);
        }

        self.session = SessionState::LoggedIn;
        info!("User {} logged in", self.username);
        Ok(())
    }

    /// Closes the session and abandons any game in play.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        if !self.is_logged_in() {
            return Err(AuthError::NotLoggedIn);
        }

        self.game.reset();
        self.session = SessionState::LoggedOut;
        info!("User {} logged out", self.username);
        Ok(())
    }

    pub fn start_game(&mut self, word: &str) -> Result<(), GameError> {
        if !self.is_logged_in() {
            return Err(GameError::NotLoggedIn);
        }

        self.game.start(word);
        self.stats.total_games += 1;
        info!(
            "User {} started game {} ({} letters)",
            self.username,
            self.stats.total_games,
            word.len()
        );
        tracing::debug!("Secret word for {}: {}", self.username, self.game.secret_word());
        Ok(())
    }

    pub fn guess(&mut self, input: &str) -> Result<GuessOutcome, GameError> {
        if !self.is_logged_in() {
            return Err(GameError::NotLoggedIn);
        }

        let outcome = self.game.guess(input)?;
        match outcome {
            GuessOutcome::Solved => {
                self.stats.wins += 1;
                info!("User {} won (wins: {})", self.username, self.stats.wins);
            }
            GuessOutcome::OutOfGuesses => {
                info!("User {} ran out of guesses", self.username);
            }
            _ => {}
        }
        Ok(outcome)
    }

    /// Snapshot for rendering. Taking a view consumes the repeated-guess flag.
    pub fn take_view(&mut self) -> Result<GameView, GameError> {
        if !self.is_logged_in() {
            return Err(GameError::NotLoggedIn);
        }

        let status = self.game.status();
        let revealed_word = (status == GameStatus::Lost).then(|| self.game.secret_word().to_string());

        Ok(GameView {
            username: self.username.clone(),
            status,
            masked_word: self.game.masked_word(),
            guessed_letters: self.game.guessed().letters().collect(),
            revealed_word,
            wrong_guesses: self.game.wrong_guesses(),
            repeat: self.game.take_repeat(),
            stats: self.stats,
        })
    }
}
