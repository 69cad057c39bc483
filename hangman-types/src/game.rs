use serde::{Deserialize, Serialize};

use crate::UserStats;

/// Number of wrong guesses that ends a game.
pub const MAX_WRONG_GUESSES: u8 = 10;

/// Placeholder shown for letters that have not been guessed yet.
pub const MASK_CHAR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Idle,       // No game started since login
    InProgress, // Accepting guesses
    Won,        // Every letter revealed
    Lost,       // Ran out of wrong guesses
}

/// What a single letter guess did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessOutcome {
    /// The letter occurs in the word.
    Hit,
    /// The letter does not occur in the word.
    Miss,
    /// The letter had been guessed before; nothing was counted.
    Repeat,
    /// The guess was not a letter and was ignored.
    Ignored,
    /// The guess revealed the last hidden letter.
    Solved,
    /// The guess used up the final wrong guess.
    OutOfGuesses,
}

/// Snapshot handed to the page renderer.
///
/// The secret word is only carried once the game has been lost, so a view can
/// never leak the answer of a game still in play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub username: String,
    pub status: GameStatus,
    pub masked_word: String,
    /// Letters guessed so far, alphabetical.
    pub guessed_letters: String,
    pub revealed_word: Option<String>,
    pub wrong_guesses: u8,
    pub repeat: bool,
    pub stats: UserStats,
}

impl GameView {
    pub fn remaining_guesses(&self) -> u8 {
        MAX_WRONG_GUESSES.saturating_sub(self.wrong_guesses)
    }
}
