pub mod account;
pub mod game_state;
pub mod letters;
pub mod word_list;

// Re-export main components
pub use account::*;
pub use game_state::*;
pub use letters::*;
pub use word_list::*;
