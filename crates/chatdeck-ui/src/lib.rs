pub mod deck;
pub mod state;


pub use deck::DeckCursor;
pub use state::UiState;
