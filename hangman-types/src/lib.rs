pub mod errors;
pub mod game;
pub mod user;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use user::*;
