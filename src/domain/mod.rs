pub mod card;
pub mod improvement;
pub mod progress;

pub use card::{Card, CardId, Deck, DeckType};
pub use improvement::{build_export_batch, ImprovementMark};
pub use progress::{CardState, Progress, ProgressStats};
