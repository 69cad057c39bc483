use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rand::Rng;
use rand::seq::SliceRandom;

/// Dictionary that secret words are drawn from.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Build a word list from newline separated text. Blank lines, `#`
    /// comments and entries with anything other than ASCII letters are
    /// skipped; the rest are stored uppercase.
    pub fn from_word_list(word_list: &str) -> Self {
        let words = word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|word| word.chars().all(|c| c.is_ascii_alphabetic()))
            .map(|word| word.to_ascii_uppercase())
            .collect();

        Self { words }
    }

    /// Load a dictionary file. An unreadable or empty dictionary is an error,
    /// since no game could ever start.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;

        let word_list = Self::from_word_list(&contents);
        if word_list.is_empty() {
            return Err(anyhow!("Dictionary {} contains no usable words", path.display()));
        }

        tracing::info!("Loaded {} words from {}", word_list.len(), path.display());
        Ok(word_list)
    }

    /// Pick a word uniformly at random.
    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str> {
        self.words
            .choose(rng)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("No words available"))
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = word.trim().to_ascii_uppercase();
        self.words.iter().any(|w| *w == word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
