use hangman_types::{GameError, GameStatus, GuessOutcome, MASK_CHAR, MAX_WRONG_GUESSES};

use crate::LetterSet;

/// A single hangman round owned by one account.
#[derive(Debug, Clone, Default)]
pub struct Game {
    status: GameStatus,
    secret_word: String, // Hidden from clients until lost
    guessed: LetterSet,
    wrong_guesses: u8,
    repeat: bool, // Set by a repeated guess, consumed by the next view
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a fresh round with `word`, discarding whatever was in play.
    pub fn start(&mut self, word: &str) {
        self.secret_word = word.to_ascii_uppercase();
        self.guessed.clear();
        self.wrong_guesses = 0;
        self.repeat = false;
        self.status = GameStatus::InProgress;
    }

    /// Applies one guess. Only the first character of `input` is considered;
    /// anything that is not an ASCII letter is ignored without changing state.
    pub fn guess(&mut self, input: &str) -> Result<GuessOutcome, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::NotInProgress);
        }

        let letter = match input.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => return Ok(GuessOutcome::Ignored),
        };

        if !self.guessed.insert(letter) {
            self.repeat = true;
            return Ok(GuessOutcome::Repeat);
        }

        if !self.secret_word.contains(letter) {
            self.wrong_guesses += 1;
            if self.wrong_guesses >= MAX_WRONG_GUESSES {
                self.status = GameStatus::Lost;
                return Ok(GuessOutcome::OutOfGuesses);
            }
            return Ok(GuessOutcome::Miss);
        }

        if self.is_solved() {
            self.status = GameStatus::Won;
            return Ok(GuessOutcome::Solved);
        }

        Ok(GuessOutcome::Hit)
    }

    /// Returns to `Idle` and forgets the round.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn masked_word(&self) -> String {
        self.secret_word
            .chars()
            .map(|c| if self.guessed.contains(c) { c } else { MASK_CHAR })
            .collect()
    }

    pub fn is_solved(&self) -> bool {
        !self.secret_word.is_empty() && self.secret_word.chars().all(|c| self.guessed.contains(c))
    }

    /// Reads and clears the repeated-guess flag.
    pub fn take_repeat(&mut self) -> bool {
        std::mem::take(&mut self.repeat)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    pub fn guessed(&self) -> LetterSet {
        self.guessed
    }

    pub fn wrong_guesses(&self) -> u8 {
        self.wrong_guesses
    }

    pub fn remaining_guesses(&self) -> u8 {
        MAX_WRONG_GUESSES - self.wrong_guesses
    }

    pub fn repeat_pending(&self) -> bool {
        self.repeat
    }
}
