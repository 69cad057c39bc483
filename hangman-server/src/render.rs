//! HTML for the game page and the 404 page. The login page is a static file.

use hangman_types::{GameStatus, GameView};

use crate::http::request::field;

pub const NOT_FOUND_PAGE: &str = "<html><body><h1>404: Page Not Found :(</h1></body></html>";

const STYLE: &str = "body{font-family:sans-serif;text-align:center}\
#word{font-size:60pt;letter-spacing:0.4em;margin:40px 0}\
#picture{max-width:400px;max-height:400px}\
#user{position:absolute;top:10px;right:20px}\
#info{margin-top:30px}\
.bar form{display:inline-block;margin:0 20px}";

pub fn game_page(view: &GameView) -> String {
    let username = escape(&view.username);

    let mut page = String::with_capacity(2048);
    page.push_str("<!DOCTYPE html><html><head><title>Hangman</title><style>");
    page.push_str(STYLE);
    page.push_str("</style></head><body><h1>Hangman</h1><div class='bar'>");
    page.push_str(&command_form(&username, field::START_NEW_GAME, "New Game"));
    page.push_str(&command_form(&username, field::LOGOUT, "Log Out"));
    page.push_str(&format!(
        "</div><div id='user'>Logged in as: <b>{}</b></div>",
        username
    ));

    match view.status {
        GameStatus::Idle => {}
        GameStatus::Lost => {
            page.push_str(&gallows(view));
            page.push_str(&format!(
                "<div id='end'>Out of guesses! You Lose!<br>The word was {}</div>",
                escape(view.revealed_word.as_deref().unwrap_or_default())
            ));
        }
        GameStatus::Won => {
            page.push_str(&word(view));
            page.push_str("<div id='end'>You Win!</div>");
        }
        GameStatus::InProgress => {
            page.push_str(&gallows(view));
            page.push_str(&word(view));
            page.push_str(&format!(
                "<form id='guessform' method='POST'>\
                 <input type='hidden' name='{}' value='{}'>\
                 <label>Guess a letter: </label>\
                 <input id='guessedLetter' type='text' name='{}' maxlength='1' \
                 pattern='[A-Za-z]{{1}}' required autofocus>\
                 <input type='submit' value='Send'></form>",
                field::CURRENT_USER,
                username,
                field::GUESSED_LETTER
            ));
            if view.repeat {
                page.push_str("<div id='repeat'>You've already guessed this letter!</div>");
            }
            page.push_str(&format!(
                "<div id='guessedNum'>{} incorrect guesses remaining.</div>",
                view.remaining_guesses()
            ));
        }
    }

    if view.status != GameStatus::Idle && !view.guessed_letters.is_empty() {
        page.push_str(&format!(
            "<div id='guessed'>Guessed so far: {}</div>",
            escape(&view.guessed_letters)
        ));
    }

    page.push_str(&format!(
        "<div id='info'>Wins: {}<br>Total Games: {}</div></body></html>",
        view.stats.wins, view.stats.total_games
    ));
    page
}

fn command_form(username: &str, marker: &str, label: &str) -> String {
    format!(
        "<form method='POST'><input type='hidden' name='{}' value='{}'>\
         <input type='hidden' name='{}'><button type='submit'>{}</button></form>",
        field::CURRENT_USER,
        username,
        marker,
        label
    )
}

fn word(view: &GameView) -> String {
    format!("<div id='word'>{}</div>", escape(&view.masked_word))
}

fn gallows(view: &GameView) -> String {
    format!(
        "<img id='picture' src='gallows{}.png' alt='{} guesses left'>",
        view.remaining_guesses(),
        view.remaining_guesses()
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
