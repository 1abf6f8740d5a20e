//! Deck content: loading, validation and the deck catalog.
//!
//! # Deck sources
//!
//! - Static decks: `*.json` files in the decks directory (`data/decks/`)
//! - User decks: imported through the API and stored in the database
//!
//! A user deck with the same id as a static deck replaces it in the catalog.

pub mod corrections;
pub mod decks;
pub mod discovery;
pub mod unlock;

pub use corrections::{apply_corrections, CorrectionReport};
pub use decks::{load_deck_file, prepare_import, validate_deck, DeckError};
pub use discovery::{scan_deck_directory, DeckCatalog};
pub use unlock::UnlockCodes;
