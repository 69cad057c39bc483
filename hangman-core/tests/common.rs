use hangman_core::{Account, Game, WordList};

/// Creates a test WordList with a known set of words
pub fn create_test_word_list() -> WordList {
    WordList::from_word_list("testing\nhangman\nthread\nsocket\nmutex")
}

/// Creates a game already in progress with a specific secret word
pub fn create_game_with_word(word: &str) -> Game {
    let mut game = Game::new();
    game.start(word);
    game
}

/// Applies each letter in `letters` as a separate guess
pub fn guess_all(game: &mut Game, letters: &str) {
    for letter in letters.chars() {
        game.guess(&letter.to_string()).unwrap();
    }
}

/// Creates an account that has already logged in
pub fn create_logged_in_account(name: &str) -> Account {
    let mut account = Account::new(name, format!("{}-pw", name));
    account.login(&format!("{}-pw", name)).unwrap();
    account
}
